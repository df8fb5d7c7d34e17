use tracing_appender::non_blocking::WorkerGuard;

use crate::infra::{config::AppConfig, storage_layout::StorageLayout};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub layout: StorageLayout,
    /// Keeps the non-blocking log writer flushing until the context drops.
    log_guard: Option<WorkerGuard>,
}

impl AppContext {
    pub fn new(config: AppConfig, layout: StorageLayout) -> Self {
        Self {
            config,
            layout,
            log_guard: None,
        }
    }

    pub fn with_log_guard(mut self, guard: Option<WorkerGuard>) -> Self {
        self.log_guard = guard;
        self
    }

    pub fn has_log_guard(&self) -> bool {
        self.log_guard.is_some()
    }
}
