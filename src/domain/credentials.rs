use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials of an authenticated session with a homeserver.
///
/// Issued by the login flow and never mutated afterwards; a new login
/// produces a new value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    pub homeserver_url: String,
    pub identity_server_url: String,
    pub user_id: String,
    pub device_id: String,
    pub access_token: String,
    #[serde(default)]
    pub guest: bool,
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("homeserver_url", &self.homeserver_url)
            .field("identity_server_url", &self.identity_server_url)
            .field("user_id", &self.user_id)
            .field("device_id", &self.device_id)
            .field("access_token", &"[REDACTED]")
            .field("guest", &self.guest)
            .finish()
    }
}
