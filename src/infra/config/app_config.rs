use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub homeserver: HomeserverConfig,
    pub client: ClientConfig,
    pub features: FeatureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// When set, logs go to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeserverConfig {
    pub url: String,
    pub identity_server_url: String,
}

impl Default for HomeserverConfig {
    fn default() -> Self {
        Self {
            url: "https://matrix.org".to_owned(),
            identity_server_url: "https://vector.im".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub initial_sync_limit: u32,
    /// Ceiling on sync subscribers per client; every rendered event tile
    /// may hold one.
    pub max_listeners: usize,
    pub sync_timeout_ms: u64,
    pub timeline_support: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            initial_sync_limit: 20,
            max_listeners: 500,
            sync_timeout_ms: 30_000,
            timeline_support: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FeatureConfig {
    pub rich_text_editor: bool,
}
