//! Public SDK surface for Cardsmith.
//!
//! This crate re-exports the building blocks and provides small helpers so
//! the binary and embedders wire things up the same way.

/// Re-export for convenience.
pub use cardsmith_config as config;
pub use cardsmith_core as core;
/// Re-export for convenience.
pub use cardsmith_protocol as protocol;
pub use cardsmith_server as server;
/// Re-export for convenience.
pub use cardsmith_store as store;

use cardsmith_config::StoreConfig;
use cardsmith_store::{FileFlashcardStore, FlashcardStore, InMemoryFlashcardStore, StoreError};
use log::{info, warn};
use std::sync::Arc;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}

/// Open the flashcard store selected by `store.provider`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn FlashcardStore>, StoreError> {
    match config.provider.as_str() {
        "memory" => {
            warn!("using in-memory flashcard store; cards are lost on exit");
            Ok(Arc::new(InMemoryFlashcardStore::new()))
        }
        "file" => {
            let path = config.resolved_path();
            info!("opening flashcard store (provider=file, path={})", path);
            Ok(Arc::new(FileFlashcardStore::new(path)?))
        }
        other => Err(StoreError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsmith_protocol::Flashcard;
    use cardsmith_test_utils::draft;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_store_writes_under_configured_path() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("cards");
        let config = StoreConfig {
            provider: "file".to_string(),
            path: Some(root.to_string_lossy().into_owned()),
        };
        let store = open_store(&config).expect("store");
        store
            .save(Flashcard::from_draft(
                "student-1",
                draft("What is ATP?", "Energy currency."),
            ))
            .await
            .expect("save");
        assert!(root.is_dir());
        assert_eq!(store.list("student-1").await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn memory_store_starts_empty() {
        let config = StoreConfig {
            provider: "memory".to_string(),
            path: None,
        };
        let store = open_store(&config).expect("store");
        assert!(store.list("student-1").await.expect("list").is_empty());
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let config = StoreConfig {
            provider: "postgres".to_string(),
            path: None,
        };
        let err = open_store(&config).err().expect("unknown provider");
        assert!(matches!(err, StoreError::UnknownProvider(name) if name == "postgres"));
    }
}
