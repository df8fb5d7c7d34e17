use anyhow::Result;

use crate::{domain::credentials::SessionCredentials, infra::config::AppConfig};

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Persistence for the credentials of the last logged-in session.
pub trait CredentialsStore {
    fn load(&self) -> Result<Option<SessionCredentials>>;
    fn save(&mut self, credentials: &SessionCredentials) -> Result<()>;
    /// Removes stored credentials; returns whether anything was removed.
    fn clear(&mut self) -> Result<bool>;
}
