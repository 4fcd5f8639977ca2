use contact_intake::config::StoreConfig;
use contact_intake::submissions::{
    InMemorySubmissionStore, JsonFileSubmissionStore, ScanFilter, ScanPage, StoreError,
    Submission, SubmissionKey, SubmissionStatus, SubmissionStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store selected at startup from `APP_STORE_PATH`.
#[derive(Debug)]
pub(crate) enum ConfiguredStore {
    Memory(InMemorySubmissionStore),
    File(JsonFileSubmissionStore),
}

pub(crate) fn open_store(config: &StoreConfig) -> Result<ConfiguredStore, StoreError> {
    match &config.path {
        Some(path) => Ok(ConfiguredStore::File(JsonFileSubmissionStore::open(path)?)),
        None => {
            warn!("APP_STORE_PATH not set, submissions are kept in memory only");
            Ok(ConfiguredStore::Memory(InMemorySubmissionStore::default()))
        }
    }
}

impl SubmissionStore for ConfiguredStore {
    fn create(&self, submission: Submission) -> Result<Submission, StoreError> {
        match self {
            Self::Memory(store) => store.create(submission),
            Self::File(store) => store.create(submission),
        }
    }

    fn get(&self, key: &SubmissionKey) -> Result<Option<Submission>, StoreError> {
        match self {
            Self::Memory(store) => store.get(key),
            Self::File(store) => store.get(key),
        }
    }

    fn update_status(
        &self,
        key: &SubmissionKey,
        status: SubmissionStatus,
    ) -> Result<Submission, StoreError> {
        match self {
            Self::Memory(store) => store.update_status(key, status),
            Self::File(store) => store.update_status(key, status),
        }
    }

    fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
        start_after: Option<&SubmissionKey>,
    ) -> Result<ScanPage, StoreError> {
        match self {
            Self::Memory(store) => store.scan(filter, limit, start_after),
            Self::File(store) => store.scan(filter, limit, start_after),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_selects_memory_store() {
        let store = open_store(&StoreConfig::default()).expect("store opens");
        assert!(matches!(store, ConfiguredStore::Memory(_)));
    }

    #[test]
    fn configured_path_selects_file_store() {
        let dir = std::env::temp_dir().join(format!("contact-intake-api-{}", std::process::id()));
        let config = StoreConfig {
            path: Some(dir.join("submissions.json")),
        };
        let store = open_store(&config).expect("store opens");
        assert!(matches!(store, ConfiguredStore::File(_)));
        std::fs::remove_dir_all(dir).ok();
    }
}
