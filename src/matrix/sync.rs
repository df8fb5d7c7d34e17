use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use reqwest::StatusCode;
use thiserror::Error;
use tokio::{
    runtime::{Handle, Runtime},
    sync::watch,
    task::JoinHandle,
};
use url::Url;

use crate::{
    domain::events::{SyncBatch, SyncSignal, SyncState},
    infra::{secrets::sanitize_errcode, session_store::SyncStore},
    matrix::{
        api::{self, MatrixErrorBody, SyncResponse},
        contracts::ClientError,
    },
};

const SYNC_MONITOR_STARTED: &str = "MATRIX_SYNC_MONITOR_STARTED";
const SYNC_MONITOR_STOPPED: &str = "MATRIX_SYNC_MONITOR_STOPPED";
const SYNC_REQUEST_FAILED: &str = "MATRIX_SYNC_REQUEST_FAILED";
const SYNC_TOKEN_REJECTED: &str = "MATRIX_SYNC_TOKEN_REJECTED";
const SYNC_POSITION_PERSIST_FAILED: &str = "MATRIX_SYNC_POSITION_PERSIST_FAILED";
const SYNC_POSITION_LOAD_FAILED: &str = "MATRIX_SYNC_POSITION_LOAD_FAILED";

const DEFAULT_MAX_LISTENERS: usize = 10;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);
/// How long `SyncMonitor::stop` waits for the loop to wind down.
const STOP_GRACE: Duration = Duration::from_secs(2);
/// Extra time allowed on top of the server-side long-poll timeout.
const HTTP_TIMEOUT_SLACK_MS: u64 = 10_000;

/// Fan-out of sync signals to a bounded number of subscribers.
#[derive(Clone, Debug)]
pub struct SyncListeners {
    inner: Arc<Mutex<ListenerState>>,
}

#[derive(Debug)]
struct ListenerState {
    max: usize,
    subscribers: Vec<Sender<SyncSignal>>,
}

impl Default for SyncListeners {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ListenerState {
                max: DEFAULT_MAX_LISTENERS,
                subscribers: Vec::new(),
            })),
        }
    }
}

impl SyncListeners {
    pub fn set_max(&self, max: usize) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .max = max;
    }

    pub fn subscribe(&self) -> Result<Receiver<SyncSignal>, ClientError> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if state.subscribers.len() >= state.max {
            return Err(ClientError::ListenerLimit { limit: state.max });
        }

        let (tx, rx) = mpsc::channel();
        state.subscribers.push(tx);
        Ok(rx)
    }

    /// Sends to every subscriber, dropping those whose receiver is gone.
    pub fn publish(&self, signal: SyncSignal) {
        if let Ok(mut state) = self.inner.lock() {
            state
                .subscribers
                .retain(|sub| sub.send(signal.clone()).is_ok());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub base_url: String,
    pub access_token: String,
    pub initial_sync_limit: u32,
    pub timeout_ms: u64,
}

/// Background `/sync` loop; stops when dropped.
#[derive(Debug)]
pub struct SyncMonitor {
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl SyncMonitor {
    pub fn start(
        runtime: &Runtime,
        request: SyncRequest,
        listeners: SyncListeners,
        store: Option<SyncStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(
                request.timeout_ms.saturating_add(HTTP_TIMEOUT_SLACK_MS),
            ))
            .build()
            .map_err(ClientError::HttpClient)?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = runtime.spawn(run_sync_loop(http, request, listeners, store, stop_rx));

        tracing::info!(code = SYNC_MONITOR_STARTED, "matrix sync monitor started");

        Ok(Self {
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }

    /// Stops the loop and waits for it to publish `Stopped`.
    ///
    /// Returns false when the loop did not finish within the grace period,
    /// or when called from inside a runtime where blocking is not allowed.
    pub fn stop(mut self, runtime: &Runtime) -> bool {
        self.signal_stop();
        let Some(task) = self.task.take() else {
            return true;
        };

        if Handle::try_current().is_ok() {
            task.abort();
            return false;
        }

        // The timer must be created inside the runtime.
        let joined = runtime.block_on(async { tokio::time::timeout(STOP_GRACE, task).await });
        matches!(joined, Ok(Ok(())))
    }

    fn signal_stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }
}

impl Drop for SyncMonitor {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

/// Resume token and whether the first batch has arrived.
#[derive(Debug, Default)]
struct SyncProgress {
    since: Option<String>,
    prepared: bool,
}

impl SyncProgress {
    fn resume_from(since: Option<String>) -> Self {
        Self {
            since,
            prepared: false,
        }
    }

    /// Persists the batch position, then publishes the batch followed by
    /// the state it moves the loop to.
    fn on_batch(
        &mut self,
        batch: SyncBatch,
        store: Option<&SyncStore>,
        listeners: &SyncListeners,
    ) -> SyncState {
        if let Some(store) = store {
            if let Err(error) = store.save_next_batch(&batch.next_batch) {
                tracing::warn!(
                    code = SYNC_POSITION_PERSIST_FAILED,
                    error = %error,
                    "failed to persist sync position"
                );
            }
        }

        tracing::debug!(
            events = batch.events.len(),
            next_batch = %batch.next_batch,
            "sync batch received"
        );
        self.since = Some(batch.next_batch.clone());

        let state = if self.prepared {
            SyncState::Syncing
        } else {
            self.prepared = true;
            SyncState::Prepared
        };
        listeners.publish(SyncSignal::Batch(batch));
        listeners.publish(SyncSignal::State(state));

        state
    }
}

#[derive(Debug, Error)]
enum SyncFetchError {
    #[error("sync request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("homeserver answered {status} ({errcode})")]
    Status { status: StatusCode, errcode: String },
}

impl SyncFetchError {
    fn is_token_rejected(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

async fn run_sync_loop(
    http: reqwest::Client,
    request: SyncRequest,
    listeners: SyncListeners,
    store: Option<SyncStore>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut progress = SyncProgress::resume_from(store.as_ref().and_then(load_position));
    let mut failures: u32 = 0;

    loop {
        let url = match api::sync_url(
            &request.base_url,
            progress.since.as_deref(),
            request.initial_sync_limit,
            request.timeout_ms,
        ) {
            Ok(url) => url,
            Err(error) => {
                tracing::error!(code = SYNC_REQUEST_FAILED, error = %error, "invalid sync url");
                listeners.publish(SyncSignal::State(SyncState::Error));
                break;
            }
        };

        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            result = fetch_sync(&http, url, &request.access_token) => {
                match result {
                    Ok(response) => {
                        failures = 0;
                        progress.on_batch(response.into_batch(), store.as_ref(), &listeners);
                    }
                    Err(error) if error.is_token_rejected() => {
                        tracing::error!(
                            code = SYNC_TOKEN_REJECTED,
                            error = %error,
                            "homeserver rejected the access token; stopping sync"
                        );
                        listeners.publish(SyncSignal::State(SyncState::Error));
                        break;
                    }
                    Err(error) => {
                        failures = failures.saturating_add(1);
                        tracing::warn!(
                            code = SYNC_REQUEST_FAILED,
                            error = %error,
                            failures,
                            "sync request failed; retrying"
                        );
                        listeners.publish(SyncSignal::State(SyncState::Error));

                        tokio::select! {
                            changed = stop_rx.changed() => {
                                if changed.is_err() || *stop_rx.borrow() {
                                    break;
                                }
                            }
                            _ = tokio::time::sleep(retry_delay(failures)) => {}
                        }
                    }
                }
            }
        }
    }

    listeners.publish(SyncSignal::State(SyncState::Stopped));
    tracing::info!(code = SYNC_MONITOR_STOPPED, "matrix sync monitor stopped");
}

async fn fetch_sync(
    http: &reqwest::Client,
    url: Url,
    access_token: &str,
) -> Result<SyncResponse, SyncFetchError> {
    let response = http.get(url).bearer_auth(access_token).send().await?;
    let status = response.status();

    if !status.is_success() {
        let body: MatrixErrorBody = response.json().await.unwrap_or_default();
        return Err(SyncFetchError::Status {
            status,
            errcode: sanitize_errcode(&body.errcode),
        });
    }

    Ok(response.json::<SyncResponse>().await?)
}

fn load_position(store: &SyncStore) -> Option<String> {
    store.load_next_batch().unwrap_or_else(|error| {
        tracing::warn!(
            code = SYNC_POSITION_LOAD_FAILED,
            error = %error,
            "ignoring unreadable sync position; starting from scratch"
        );
        None
    })
}

/// Exponential backoff starting at one second, capped at a minute.
fn retry_delay(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(6);
    Duration::from_secs(1u64 << exponent).min(MAX_RETRY_DELAY)
}
