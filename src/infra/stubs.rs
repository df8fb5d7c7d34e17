use anyhow::Result;

use crate::{domain::credentials::SessionCredentials, infra::contracts::CredentialsStore};

#[cfg(test)]
use crate::infra::{config::AppConfig, contracts::ConfigAdapter};

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

#[cfg(test)]
impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Credentials store that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialsStore {
    pub credentials: Option<SessionCredentials>,
}

impl CredentialsStore for InMemoryCredentialsStore {
    fn load(&self) -> Result<Option<SessionCredentials>> {
        Ok(self.credentials.clone())
    }

    fn save(&mut self, credentials: &SessionCredentials) -> Result<()> {
        self.credentials = Some(credentials.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<bool> {
        Ok(self.credentials.take().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_config_returns_defaults() {
        let adapter = StubConfigAdapter;
        let config = adapter.load().expect("stub config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn in_memory_store_clear_reports_presence() {
        let mut store = InMemoryCredentialsStore::default();

        assert!(!store.clear().expect("clear on empty store"));
    }
}
