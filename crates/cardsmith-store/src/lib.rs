//! Per-user flashcard persistence for Cardsmith.
//!
//! Every operation is scoped by the owning user. A card that belongs to
//! someone else is indistinguishable from a missing one.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

/// Store error type.
pub use error::StoreError;
/// JSONL-backed store.
pub use file::FileFlashcardStore;
/// Process-local store.
pub use memory::InMemoryFlashcardStore;
/// Store interface.
pub use store::FlashcardStore;
