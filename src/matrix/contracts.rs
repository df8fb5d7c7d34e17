use thiserror::Error;

use crate::infra::session_store::SyncStore;

/// How locally-sent events that have not been echoed back are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingEventOrdering {
    /// Pending events sit in the main timeline in send order.
    #[default]
    Chronological,
    /// Pending events are kept apart until the server echoes them.
    Detached,
}

/// Options used when a client begins syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOptions {
    pub initial_sync_limit: u32,
    pub sync_timeout_ms: u64,
    pub pending_event_ordering: PendingEventOrdering,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            initial_sync_limit: 20,
            sync_timeout_ms: 30_000,
            pending_event_ordering: PendingEventOrdering::Chronological,
        }
    }
}

/// Everything needed to construct an authenticated client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateClientOptions {
    pub base_url: String,
    pub identity_base_url: String,
    pub access_token: String,
    pub user_id: String,
    pub device_id: String,
    pub timeline_support: bool,
    pub session_store: Option<SyncStore>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid {field}: {reason}")]
    InvalidCredentials { field: &'static str, reason: String },
    #[error("listener limit of {limit} reached")]
    ListenerLimit { limit: usize },
    #[error("failed to start sync runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// An authenticated session with a homeserver.
pub trait MatrixClient {
    fn base_url(&self) -> &str;
    fn identity_base_url(&self) -> &str;
    fn user_id(&self) -> &str;
    fn device_id(&self) -> &str;
    fn access_token(&self) -> &str;
    fn is_guest(&self) -> bool;
    fn set_guest(&mut self, guest: bool);
    fn set_max_listeners(&mut self, max: usize);
    fn start_client(&mut self, options: StartOptions) -> Result<(), ClientError>;
    fn stop_client(&mut self);
    /// Resolves an `mxc://` content URI to a downloadable HTTP URL.
    fn mxc_url_to_http(&self, mxc_url: &str) -> Option<String>;
}

pub trait ClientFactory {
    type Client: MatrixClient;

    fn create_client(&self, options: CreateClientOptions) -> Result<Self::Client, ClientError>;
}
