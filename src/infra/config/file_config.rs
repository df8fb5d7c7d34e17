use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{AppConfig, ClientConfig, FeatureConfig, HomeserverConfig, LogConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub homeserver: Option<FileHomeserverConfig>,
    pub client: Option<FileClientConfig>,
    pub features: Option<FileFeatureConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(homeserver) = self.homeserver {
            homeserver.merge_into(&mut config.homeserver);
        }

        if let Some(client) = self.client {
            client.merge_into(&mut config.client);
        }

        if let Some(features) = self.features {
            features.merge_into(&mut config.features);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = Some(file);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileHomeserverConfig {
    pub url: Option<String>,
    pub identity_server_url: Option<String>,
}

impl FileHomeserverConfig {
    fn merge_into(self, config: &mut HomeserverConfig) {
        if let Some(url) = self.url {
            config.url = url;
        }

        if let Some(identity_server_url) = self.identity_server_url {
            config.identity_server_url = identity_server_url;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileClientConfig {
    pub initial_sync_limit: Option<u32>,
    pub max_listeners: Option<usize>,
    pub sync_timeout_ms: Option<u64>,
    pub timeline_support: Option<bool>,
}

impl FileClientConfig {
    fn merge_into(self, config: &mut ClientConfig) {
        if let Some(limit) = self.initial_sync_limit {
            config.initial_sync_limit = limit;
        }

        if let Some(max_listeners) = self.max_listeners {
            config.max_listeners = max_listeners;
        }

        if let Some(timeout_ms) = self.sync_timeout_ms {
            config.sync_timeout_ms = timeout_ms;
        }

        if let Some(timeline_support) = self.timeline_support {
            config.timeline_support = timeline_support;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileFeatureConfig {
    pub rich_text_editor: Option<bool>,
}

impl FileFeatureConfig {
    fn merge_into(self, config: &mut FeatureConfig) {
        if let Some(enabled) = self.rich_text_editor {
            config.rich_text_editor = enabled;
        }
    }
}
