//! Flashcard records and the drafts the generator produces.

use crate::{FlashcardId, ParseLabelError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Category assigned when nothing better applies.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Difficulty level of a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// All levels, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Lowercase label used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseLabelError::new("difficulty", value)),
        }
    }
}

/// A generated card that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashcardDraft {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub source_excerpt: String,
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

impl FlashcardDraft {
    /// True when both sides of the card carry visible text.
    pub fn is_complete(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Persisted flashcard owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    pub id: FlashcardId,
    pub user_id: UserId,
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub source_excerpt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    /// Assign identity and ownership to a draft.
    pub fn from_draft(user_id: impl Into<UserId>, draft: FlashcardDraft) -> Self {
        let now = Utc::now();
        let category = if draft.category.trim().is_empty() {
            default_category()
        } else {
            draft.category
        };
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            question: draft.question,
            answer: draft.answer,
            difficulty: draft.difficulty,
            category,
            source_excerpt: draft.source_excerpt,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial edit and refresh `updated_at`.
    pub fn apply(&mut self, edit: FlashcardEdit) {
        if let Some(question) = edit.question {
            self.question = question;
        }
        if let Some(answer) = edit.answer {
            self.answer = answer;
        }
        if let Some(difficulty) = edit.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(category) = edit.category {
            self.category = category;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update for a stored flashcard. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FlashcardEdit {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub category: Option<String>,
}

impl FlashcardEdit {
    /// Name of the first text field that would become blank, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        if self.question.as_deref().is_some_and(|q| q.trim().is_empty()) {
            return Some("question");
        }
        if self.answer.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Some("answer");
        }
        None
    }
}
