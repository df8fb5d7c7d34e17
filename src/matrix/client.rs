use std::{fmt, sync::mpsc::Receiver};

use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::{
    domain::events::{SyncSignal, SyncState},
    infra::session_store::SyncStore,
    matrix::{
        contracts::{
            ClientError, ClientFactory, CreateClientOptions, MatrixClient, PendingEventOrdering,
            StartOptions,
        },
        media,
        sync::{SyncListeners, SyncMonitor, SyncRequest},
    },
};

const CLIENT_ALREADY_STARTED: &str = "MATRIX_CLIENT_ALREADY_STARTED";

/// Client for a homeserver reached over the client-server HTTP API.
///
/// Construction does no I/O. Syncing starts on [`MatrixClient::start_client`]
/// on a runtime owned by the client and stops on `stop_client` or drop.
///
/// The pending-event ordering from the start options is recorded but has
/// no effect yet: this client sends nothing, so it never holds local echoes
/// to order.
pub struct HomeserverClient {
    base_url: String,
    identity_base_url: String,
    user_id: String,
    device_id: String,
    access_token: String,
    timeline_support: bool,
    guest: bool,
    listeners: SyncListeners,
    sync_store: Option<SyncStore>,
    pending_event_ordering: PendingEventOrdering,
    runtime: Option<Runtime>,
    monitor: Option<SyncMonitor>,
}

impl HomeserverClient {
    pub fn subscribe(&self) -> Result<Receiver<SyncSignal>, ClientError> {
        self.listeners.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.monitor.is_some()
    }

    pub fn timeline_support(&self) -> bool {
        self.timeline_support
    }

}

impl fmt::Debug for HomeserverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeserverClient")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("device_id", &self.device_id)
            .field("guest", &self.guest)
            .field("pending_event_ordering", &self.pending_event_ordering)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl MatrixClient for HomeserverClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn identity_base_url(&self) -> &str {
        &self.identity_base_url
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn is_guest(&self) -> bool {
        self.guest
    }

    fn set_guest(&mut self, guest: bool) {
        self.guest = guest;
    }

    fn set_max_listeners(&mut self, max: usize) {
        self.listeners.set_max(max);
    }

    fn start_client(&mut self, options: StartOptions) -> Result<(), ClientError> {
        if self.is_running() {
            tracing::warn!(
                code = CLIENT_ALREADY_STARTED,
                user_id = %self.user_id,
                "start requested for a client that is already syncing"
            );
            return Ok(());
        }

        let runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("rmx-sync")
                .enable_all()
                .build()
                .map_err(ClientError::Runtime)?,
        };

        let request = SyncRequest {
            base_url: self.base_url.clone(),
            access_token: self.access_token.clone(),
            initial_sync_limit: options.initial_sync_limit,
            timeout_ms: options.sync_timeout_ms,
        };

        let monitor = SyncMonitor::start(
            &runtime,
            request,
            self.listeners.clone(),
            self.sync_store.clone(),
        );
        self.runtime = Some(runtime);
        self.monitor = Some(monitor?);
        self.pending_event_ordering = options.pending_event_ordering;

        tracing::info!(
            user_id = %self.user_id,
            initial_sync_limit = options.initial_sync_limit,
            pending_event_ordering = ?options.pending_event_ordering,
            "matrix client started"
        );

        Ok(())
    }

    fn stop_client(&mut self) {
        let monitor = self.monitor.take();
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        if let Some(monitor) = monitor {
            // Subscribers always see `Stopped`, even if the loop was cut off.
            if !monitor.stop(&runtime) {
                self.listeners.publish(SyncSignal::State(SyncState::Stopped));
            }
            tracing::info!(user_id = %self.user_id, "matrix client stopped");
        }

        runtime.shutdown_background();
    }

    fn mxc_url_to_http(&self, mxc_url: &str) -> Option<String> {
        media::mxc_to_http(&self.base_url, mxc_url)
    }
}

impl Drop for HomeserverClient {
    fn drop(&mut self) {
        self.stop_client();
    }
}

/// Builds [`HomeserverClient`]s after validating the credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeserverClientFactory;

impl ClientFactory for HomeserverClientFactory {
    type Client = HomeserverClient;

    fn create_client(&self, options: CreateClientOptions) -> Result<HomeserverClient, ClientError> {
        validate_http_url("homeserver url", &options.base_url)?;
        if !options.identity_base_url.is_empty() {
            validate_http_url("identity server url", &options.identity_base_url)?;
        }
        validate_user_id(&options.user_id)?;
        require_non_empty("device id", &options.device_id)?;
        require_non_empty("access token", &options.access_token)?;

        Ok(HomeserverClient {
            base_url: options.base_url,
            identity_base_url: options.identity_base_url,
            user_id: options.user_id,
            device_id: options.device_id,
            access_token: options.access_token,
            timeline_support: options.timeline_support,
            guest: false,
            listeners: SyncListeners::default(),
            sync_store: options.session_store,
            pending_event_ordering: PendingEventOrdering::default(),
            runtime: None,
            monitor: None,
        })
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ClientError {
    ClientError::InvalidCredentials {
        field,
        reason: reason.into(),
    }
}

fn validate_http_url(field: &'static str, value: &str) -> Result<(), ClientError> {
    let url = Url::parse(value).map_err(|error| invalid(field, error.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(invalid(field, "missing host"));
    }

    Ok(())
}

/// Accepts `@localpart:server`.
fn validate_user_id(user_id: &str) -> Result<(), ClientError> {
    let rest = user_id
        .strip_prefix('@')
        .ok_or_else(|| invalid("user id", "must start with `@`"))?;

    match rest.split_once(':') {
        Some((localpart, server)) if !localpart.is_empty() && !server.is_empty() => Ok(()),
        _ => Err(invalid("user id", "expected `@localpart:server`")),
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }

    Ok(())
}
