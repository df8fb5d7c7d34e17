use thiserror::Error;

use crate::{
    domain::credentials::SessionCredentials,
    infra::contracts::CredentialsStore,
    matrix::ClientFactory,
    usecases::session::{ClientSession, SessionError},
};

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("no stored session; run `rmx login` first")]
    NoStoredSession,
    #[error("failed to read stored session: {0}")]
    Store(#[source] anyhow::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Loads stored credentials and makes them the active session.
pub fn restore<F: ClientFactory>(
    session: &mut ClientSession<F>,
    store: &dyn CredentialsStore,
) -> Result<SessionCredentials, RestoreError> {
    let credentials = store
        .load()
        .map_err(RestoreError::Store)?
        .ok_or(RestoreError::NoStoredSession)?;

    session.replace(&credentials)?;
    tracing::info!(
        user_id = %credentials.user_id,
        guest = credentials.guest,
        "stored session restored"
    );

    Ok(credentials)
}
