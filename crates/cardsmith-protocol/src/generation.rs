//! Request and result envelopes for flashcard generation.

use crate::{Difficulty, FlashcardDraft, ParseLabelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty requested by the caller. `Mixed` leaves classification as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    Easy,
    Medium,
    Hard,
    Mixed,
}

impl DifficultyFilter {
    /// The single difficulty this filter pins, if any.
    pub fn target(self) -> Option<Difficulty> {
        match self {
            Self::Easy => Some(Difficulty::Easy),
            Self::Medium => Some(Difficulty::Medium),
            Self::Hard => Some(Difficulty::Hard),
            Self::Mixed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyFilter {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "mixed" => Ok(Self::Mixed),
            _ => Err(ParseLabelError::new("difficulty filter", value)),
        }
    }
}

/// Raw generation request as received from a caller.
///
/// Fields stay loosely typed so that validation, not deserialization, decides
/// what is acceptable and can report it as a validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub notes: String,
    pub count: i64,
    #[serde(default = "default_filter")]
    pub difficulty: String,
    #[serde(default)]
    pub subject: Option<String>,
}

fn default_filter() -> String {
    DifficultyFilter::Mixed.as_str().to_string()
}

impl GenerationRequest {
    pub fn new(notes: impl Into<String>, count: i64, difficulty: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            count,
            difficulty: difficulty.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Metadata describing how a result was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationMetadata {
    /// Milliseconds from request receipt to final shaping.
    pub duration_ms: u64,
    /// Model identifier reported by the provider.
    pub model: String,
    /// Provider confidence in [0, 1].
    pub confidence: f32,
    /// Number of cards the caller asked for.
    pub requested: usize,
    /// Provider items discarded during parsing or filtering.
    pub dropped: usize,
}

/// Transient generation output. Cards are in provider order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub cards: Vec<FlashcardDraft>,
    pub metadata: GenerationMetadata,
}
