//! Use case for obtaining session credentials from a homeserver.
//!
//! Authentication itself is delegated to a `LoginBackend`; this module
//! validates input, maps backend failures onto domain errors and persists
//! the resulting credentials.

use thiserror::Error;

use crate::{domain::credentials::SessionCredentials, infra::contracts::CredentialsStore};

/// What the homeserver hands back after a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub user_id: String,
    pub access_token: String,
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginMethod {
    Password { user: String, password: String },
    Guest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCommand {
    pub homeserver_url: String,
    pub identity_server_url: String,
    pub method: LoginMethod,
}

/// Errors reported by the backend talking to the homeserver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginSourceError {
    /// Wrong user or password.
    Forbidden,
    /// The homeserver does not allow guest registration.
    GuestAccessDisabled,
    RateLimited { retry_after_ms: Option<u64> },
    /// Network failure or unexpected response; `code` is safe to log.
    Unavailable { code: String },
}

/// Domain-level errors for the login operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("user name must not be empty")]
    EmptyUser,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("invalid user name or password")]
    InvalidCredentials,
    #[error("this homeserver does not allow guest access")]
    GuestAccessDisabled,
    #[error("too many requests; try again later")]
    RateLimited { retry_after_ms: Option<u64> },
    #[error("homeserver temporarily unavailable ({code})")]
    TemporarilyUnavailable { code: String },
    #[error("failed to save session: {0}")]
    Store(String),
}

pub trait LoginBackend {
    fn password_login(
        &self,
        homeserver_url: &str,
        user: &str,
        password: &str,
    ) -> Result<LoginGrant, LoginSourceError>;

    fn register_guest(&self, homeserver_url: &str) -> Result<LoginGrant, LoginSourceError>;
}

/// Logs in and stores the resulting credentials.
pub fn login(
    backend: &dyn LoginBackend,
    store: &mut dyn CredentialsStore,
    command: LoginCommand,
) -> Result<SessionCredentials, LoginError> {
    let (grant, guest) = match &command.method {
        LoginMethod::Password { user, password } => {
            let user = user.trim();
            if user.is_empty() {
                return Err(LoginError::EmptyUser);
            }
            if password.is_empty() {
                return Err(LoginError::EmptyPassword);
            }

            let grant = backend
                .password_login(&command.homeserver_url, user, password)
                .map_err(map_source_error)?;
            (grant, false)
        }
        LoginMethod::Guest => {
            let grant = backend
                .register_guest(&command.homeserver_url)
                .map_err(map_source_error)?;
            (grant, true)
        }
    };

    let credentials = SessionCredentials {
        homeserver_url: command.homeserver_url,
        identity_server_url: command.identity_server_url,
        user_id: grant.user_id,
        device_id: grant.device_id,
        access_token: grant.access_token,
        guest,
    };

    store
        .save(&credentials)
        .map_err(|error| LoginError::Store(error.to_string()))?;

    tracing::info!(
        user_id = %credentials.user_id,
        device_id = %credentials.device_id,
        guest = credentials.guest,
        "session credentials saved"
    );

    Ok(credentials)
}

fn map_source_error(error: LoginSourceError) -> LoginError {
    match error {
        LoginSourceError::Forbidden => LoginError::InvalidCredentials,
        LoginSourceError::GuestAccessDisabled => LoginError::GuestAccessDisabled,
        LoginSourceError::RateLimited { retry_after_ms } => {
            LoginError::RateLimited { retry_after_ms }
        }
        LoginSourceError::Unavailable { code } => LoginError::TemporarilyUnavailable { code },
    }
}
