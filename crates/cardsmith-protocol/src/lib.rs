//! Wire types and provider seams shared by the Cardsmith generator, stores,
//! and HTTP API.

mod billing;
mod card;
mod generation;
mod provider;

pub use billing::{Plan, Receipt};
pub use card::{Difficulty, Flashcard, FlashcardDraft, FlashcardEdit, UNCATEGORIZED};
pub use generation::{DifficultyFilter, GenerationMetadata, GenerationRequest, GenerationResult};
pub use provider::{Completion, ProviderFailure, TextProvider};

use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a stored flashcard.
pub type FlashcardId = Uuid;

/// Opaque identifier for the owning user, issued by the external auth service.
pub type UserId = String;

/// Raised when a label does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind} value: {value:?}")]
pub struct ParseLabelError {
    /// Which label family failed to parse.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
