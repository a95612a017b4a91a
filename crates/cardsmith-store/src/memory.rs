//! Process-local store, used for development servers and tests.

use crate::error::StoreError;
use crate::store::{FlashcardStore, ensure_complete, ensure_edit_complete};
use async_trait::async_trait;
use cardsmith_protocol::{Flashcard, FlashcardEdit, FlashcardId, UserId};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory flashcard store keyed by owner.
#[derive(Debug, Default)]
pub struct InMemoryFlashcardStore {
    cards: RwLock<HashMap<UserId, Vec<Flashcard>>>,
}

impl InMemoryFlashcardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlashcardStore for InMemoryFlashcardStore {
    async fn save(&self, card: Flashcard) -> Result<FlashcardId, StoreError> {
        ensure_complete(&card)?;
        let mut cards = self.cards.write();
        let owned = cards.entry(card.user_id.clone()).or_default();
        if owned.iter().any(|existing| existing.id == card.id) {
            return Err(StoreError::Rejected(format!(
                "flashcard {} already exists",
                card.id
            )));
        }
        let id = card.id;
        debug!("saved flashcard (user_id={}, id={})", card.user_id, id);
        owned.push(card);
        Ok(id)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Flashcard>, StoreError> {
        Ok(self.cards.read().get(user_id).cloned().unwrap_or_default())
    }

    async fn update(
        &self,
        user_id: &str,
        id: FlashcardId,
        edit: FlashcardEdit,
    ) -> Result<Flashcard, StoreError> {
        ensure_edit_complete(&edit)?;
        let mut cards = self.cards.write();
        let card = cards
            .get_mut(user_id)
            .and_then(|owned| owned.iter_mut().find(|card| card.id == id))
            .ok_or(StoreError::NotFound(id))?;
        card.apply(edit);
        Ok(card.clone())
    }

    async fn delete(&self, user_id: &str, id: FlashcardId) -> Result<(), StoreError> {
        let mut cards = self.cards.write();
        let owned = cards.get_mut(user_id).ok_or(StoreError::NotFound(id))?;
        let before = owned.len();
        owned.retain(|card| card.id != id);
        if owned.len() == before {
            return Err(StoreError::NotFound(id));
        }
        debug!("deleted flashcard (user_id={}, id={})", user_id, id);
        Ok(())
    }
}
