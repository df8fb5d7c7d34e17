//! The active client session.
//!
//! `ClientSession` owns at most one client built from session credentials.
//! It is passed explicitly to whoever needs the client; UI code borrows the
//! client for the duration of a call and never keeps it.

use std::fmt;

use thiserror::Error;

use crate::{
    domain::credentials::SessionCredentials,
    infra::{config::ClientConfig, session_store::SyncStore},
    matrix::{
        ClientError, ClientFactory, CreateClientOptions, MatrixClient, PendingEventOrdering,
        StartOptions,
    },
};

const SESSION_REPLACED: &str = "SESSION_REPLACED";
const SESSION_UNSET: &str = "SESSION_UNSET";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active session")]
    NoActiveSession,
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Defaults copied into every `start`; edits apply to later starts only.
    pub start_defaults: StartOptions,
    pub max_listeners: usize,
    pub timeline_support: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for SessionSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            start_defaults: StartOptions {
                initial_sync_limit: config.initial_sync_limit,
                sync_timeout_ms: config.sync_timeout_ms,
                ..StartOptions::default()
            },
            max_listeners: config.max_listeners,
            timeline_support: config.timeline_support,
        }
    }
}

pub struct ClientSession<F: ClientFactory> {
    factory: F,
    settings: SessionSettings,
    sync_store: Option<SyncStore>,
    client: Option<F::Client>,
}

impl<F: ClientFactory> ClientSession<F> {
    pub fn new(factory: F, settings: SessionSettings, sync_store: Option<SyncStore>) -> Self {
        Self {
            factory,
            settings,
            sync_store,
            client: None,
        }
    }

    pub fn get(&self) -> Option<&F::Client> {
        self.client.as_ref()
    }

    /// Like [`Self::get`], for callers that cannot proceed without a client.
    pub fn client(&self) -> Result<&F::Client, SessionError> {
        self.client.as_ref().ok_or(SessionError::NoActiveSession)
    }

    pub fn state(&self) -> SessionState {
        if self.client.is_some() {
            SessionState::Active
        } else {
            SessionState::Empty
        }
    }

    pub fn settings_mut(&mut self) -> &mut SessionSettings {
        &mut self.settings
    }

    /// Builds a client from `credentials` and makes it the active one.
    ///
    /// If construction fails the current client, if any, stays active. On
    /// success the previous client is stopped before it is discarded.
    pub fn replace(&mut self, credentials: &SessionCredentials) -> Result<(), SessionError> {
        let options = CreateClientOptions {
            base_url: credentials.homeserver_url.clone(),
            identity_base_url: credentials.identity_server_url.clone(),
            access_token: credentials.access_token.clone(),
            user_id: credentials.user_id.clone(),
            device_id: credentials.device_id.clone(),
            timeline_support: self.settings.timeline_support,
            session_store: self.sync_store.clone(),
        };

        let mut client = self.factory.create_client(options)?;
        client.set_max_listeners(self.settings.max_listeners);
        client.set_guest(credentials.guest);

        if let Some(mut previous) = self.client.take() {
            previous.stop_client();
            tracing::info!(
                code = SESSION_REPLACED,
                previous_user_id = %previous.user_id(),
                user_id = %credentials.user_id,
                "active session replaced"
            );
        }

        self.client = Some(client);
        Ok(())
    }

    /// Start options for the next `start`: a copy of the defaults with
    /// detached pending-event ordering forced on.
    pub fn start_options(&self) -> StartOptions {
        let mut options = self.settings.start_defaults.clone();
        options.pending_event_ordering = PendingEventOrdering::Detached;
        options
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        let options = self.start_options();
        let client = self
            .client
            .as_mut()
            .ok_or(SessionError::NoActiveSession)?;

        client.start_client(options)?;
        Ok(())
    }

    /// Reads the credentials back from the live client.
    pub fn credentials(&self) -> Result<SessionCredentials, SessionError> {
        let client = self.client()?;

        Ok(SessionCredentials {
            homeserver_url: client.base_url().to_owned(),
            identity_server_url: client.identity_base_url().to_owned(),
            user_id: client.user_id().to_owned(),
            device_id: client.device_id().to_owned(),
            access_token: client.access_token().to_owned(),
            guest: client.is_guest(),
        })
    }

    pub fn unset(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.stop_client();
            tracing::info!(
                code = SESSION_UNSET,
                user_id = %client.user_id(),
                "active session cleared"
            );
        }
    }
}

impl<F: ClientFactory> fmt::Debug for ClientSession<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("state", &self.state())
            .field("user_id", &self.client.as_ref().map(|c| c.user_id()))
            .field("settings", &self.settings)
            .finish()
    }
}
