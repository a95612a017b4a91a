//! File-backed store keeping one JSONL file per user.

use crate::error::StoreError;
use crate::store::{FlashcardStore, ensure_complete, ensure_edit_complete};
use async_trait::async_trait;
use cardsmith_protocol::{Flashcard, FlashcardEdit, FlashcardId};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// File-backed flashcard store.
///
/// Writes hold the lock exclusively and reads share it, so a reader never
/// sees a half-appended line or a rewrite in progress.
#[derive(Debug)]
pub struct FileFlashcardStore {
    root: PathBuf,
    lock: RwLock<()>,
}

impl FileFlashcardStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file flashcard store (root={})", root.display());
        Ok(Self {
            root,
            lock: RwLock::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the user's JSONL file. User ids are hex-encoded so that any
    /// id maps to a safe, unique file name.
    fn user_path(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl", encode_user(user_id)))
    }

    fn temp_path(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl.tmp", encode_user(user_id)))
    }

    fn load_cards(&self, user_id: &str) -> Result<Vec<Flashcard>, StoreError> {
        let path = self.user_path(user_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(OpenOptions::new().read(true).open(path)?);
        let mut cards = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let card: Flashcard = match serde_json::from_str(&line) {
                Ok(card) => card,
                Err(err) => {
                    warn!(
                        "skipping unreadable flashcard line (user_id={}, line={}, err={})",
                        user_id,
                        index + 1,
                        err
                    );
                    continue;
                }
            };
            // Rows written under another owner are never surfaced.
            if card.user_id == user_id {
                cards.push(card);
            }
        }
        Ok(cards)
    }

    /// Rewrite a user's cards through a temp file and rename.
    fn write_cards(&self, user_id: &str, cards: &[Flashcard]) -> Result<(), StoreError> {
        let path = self.user_path(user_id);
        let temp_path = self.temp_path(user_id);
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            for card in cards {
                writeln!(file, "{}", serde_json::to_string(card)?)?;
            }
            file.sync_all()?;
        }
        std::fs::rename(temp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl FlashcardStore for FileFlashcardStore {
    async fn save(&self, card: Flashcard) -> Result<FlashcardId, StoreError> {
        ensure_complete(&card)?;
        let _guard = self.lock.write();
        if self
            .load_cards(&card.user_id)?
            .iter()
            .any(|existing| existing.id == card.id)
        {
            return Err(StoreError::Rejected(format!(
                "flashcard {} already exists",
                card.id
            )));
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.user_path(&card.user_id))?;
        let mut line = serde_json::to_string(&card)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        debug!(
            "saved flashcard (user_id={}, id={}, difficulty={})",
            card.user_id, card.id, card.difficulty
        );
        Ok(card.id)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Flashcard>, StoreError> {
        let cards = {
            let _guard = self.lock.read();
            self.load_cards(user_id)?
        };
        debug!(
            "listed flashcards (user_id={}, count={})",
            user_id,
            cards.len()
        );
        Ok(cards)
    }

    async fn update(
        &self,
        user_id: &str,
        id: FlashcardId,
        edit: FlashcardEdit,
    ) -> Result<Flashcard, StoreError> {
        ensure_edit_complete(&edit)?;
        let _guard = self.lock.write();
        let mut cards = self.load_cards(user_id)?;
        let card = cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or(StoreError::NotFound(id))?;
        card.apply(edit);
        let updated = card.clone();
        self.write_cards(user_id, &cards)?;
        debug!("updated flashcard (user_id={}, id={})", user_id, id);
        Ok(updated)
    }

    async fn delete(&self, user_id: &str, id: FlashcardId) -> Result<(), StoreError> {
        let _guard = self.lock.write();
        let mut cards = self.load_cards(user_id)?;
        let before = cards.len();
        cards.retain(|card| card.id != id);
        if cards.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.write_cards(user_id, &cards)?;
        info!(
            "deleted flashcard (user_id={}, id={}, remaining={})",
            user_id,
            id,
            cards.len()
        );
        Ok(())
    }
}

fn encode_user(user_id: &str) -> String {
    user_id
        .bytes()
        .fold(String::with_capacity(user_id.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
