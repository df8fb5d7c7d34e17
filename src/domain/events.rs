use super::message::TimelineEvent;

/// Lifecycle of the background sync loop, as observed by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// The first sync response has been processed.
    Prepared,
    /// An incremental sync response has been processed.
    Syncing,
    /// The last request failed; the loop keeps retrying.
    Error,
    /// The loop has shut down.
    Stopped,
}

impl SyncState {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Prepared => "SYNC_PREPARED",
            Self::Syncing => "SYNC_SYNCING",
            Self::Error => "SYNC_ERROR",
            Self::Stopped => "SYNC_STOPPED",
        }
    }
}

/// One processed sync response.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncBatch {
    pub next_batch: String,
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncSignal {
    State(SyncState),
    Batch(SyncBatch),
}
