//! Store abstraction shared by every backend.

use crate::error::StoreError;
use async_trait::async_trait;
use cardsmith_protocol::{Flashcard, FlashcardEdit, FlashcardId};

#[async_trait]
/// Owner-scoped flashcard persistence.
pub trait FlashcardStore: Send + Sync {
    /// Persist a new card under `card.user_id` and return its id.
    async fn save(&self, card: Flashcard) -> Result<FlashcardId, StoreError>;

    /// All cards owned by `user_id`, oldest first.
    async fn list(&self, user_id: &str) -> Result<Vec<Flashcard>, StoreError>;

    /// Fetch one card owned by `user_id`.
    async fn get(&self, user_id: &str, id: FlashcardId) -> Result<Flashcard, StoreError> {
        self.list(user_id)
            .await?
            .into_iter()
            .find(|card| card.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Apply an edit to a card owned by `user_id` and return the updated card.
    async fn update(
        &self,
        user_id: &str,
        id: FlashcardId,
        edit: FlashcardEdit,
    ) -> Result<Flashcard, StoreError>;

    /// Remove a card owned by `user_id`.
    async fn delete(&self, user_id: &str, id: FlashcardId) -> Result<(), StoreError>;
}

/// Reject cards whose text sides are blank.
pub(crate) fn ensure_complete(card: &Flashcard) -> Result<(), StoreError> {
    if card.question.trim().is_empty() || card.answer.trim().is_empty() {
        return Err(StoreError::Rejected(
            "question and answer must not be empty".to_string(),
        ));
    }
    if card.user_id.trim().is_empty() {
        return Err(StoreError::Rejected("flashcard has no owner".to_string()));
    }
    Ok(())
}

/// Reject edits that would blank out a text side.
pub(crate) fn ensure_edit_complete(edit: &FlashcardEdit) -> Result<(), StoreError> {
    match edit.blank_field() {
        Some(field) => Err(StoreError::Rejected(format!("{field} must not be empty"))),
        None => Ok(()),
    }
}
