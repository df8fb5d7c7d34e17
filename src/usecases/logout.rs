use crate::{
    infra::{contracts::CredentialsStore, error::AppError, session_store::SyncStore},
    matrix::ClientFactory,
    usecases::session::ClientSession,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub credentials_removed: bool,
    pub sync_position_removed: bool,
}

/// Stops the active client and forgets everything stored for it.
///
/// Running it with nothing stored is not an error.
pub fn logout<F: ClientFactory>(
    session: &mut ClientSession<F>,
    credentials: &mut dyn CredentialsStore,
    sync_store: &SyncStore,
) -> Result<LogoutOutcome, AppError> {
    session.unset();

    let credentials_removed = credentials.clear()?;
    let sync_position_removed = sync_store.clear()?;

    tracing::info!(
        credentials_removed,
        sync_position_removed,
        "logout completed"
    );

    Ok(LogoutOutcome {
        credentials_removed,
        sync_position_removed,
    })
}
