//! Error types for flashcard persistence.

use cardsmith_protocol::FlashcardId;

/// Errors returned by flashcard stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// No card with this id is visible to the caller.
    #[error("flashcard not found: {0}")]
    NotFound(FlashcardId),
    /// The write was refused by the store.
    #[error("write rejected: {0}")]
    Rejected(String),
    /// `store.provider` names a backend that does not exist.
    #[error("unknown store provider: {0}")]
    UnknownProvider(String),
}
