//! Request validation and note cleaning.
//!
//! Everything here runs before the provider is contacted, so a rejected
//! request never costs a model call.

use crate::error::GenerationError;
use cardsmith_protocol::{DifficultyFilter, GenerationRequest};

/// A request that passed validation, with cleaned notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub notes: String,
    pub count: usize,
    pub filter: DifficultyFilter,
    pub subject: Option<String>,
}

/// Check a raw request against the per-request ceiling and note limit.
pub fn validate_request(
    request: &GenerationRequest,
    ceiling: usize,
    max_notes_chars: usize,
) -> Result<ValidatedRequest, GenerationError> {
    if request.notes.trim().is_empty() {
        return Err(GenerationError::Validation(
            "notes must not be empty".to_string(),
        ));
    }
    let notes_chars = request.notes.chars().count();
    if notes_chars > max_notes_chars {
        return Err(GenerationError::Validation(format!(
            "notes are {notes_chars} characters, the limit is {max_notes_chars}"
        )));
    }
    if request.count <= 0 {
        return Err(GenerationError::Validation(format!(
            "count must be at least 1, got {}",
            request.count
        )));
    }
    let count = usize::try_from(request.count).unwrap_or(usize::MAX);
    if count > ceiling {
        return Err(GenerationError::Validation(format!(
            "count {count} exceeds the limit of {ceiling} cards per request"
        )));
    }
    let filter = request
        .difficulty
        .parse::<DifficultyFilter>()
        .map_err(|err| GenerationError::Validation(err.to_string()))?;

    let notes = clean_notes(&request.notes);
    if notes.is_empty() {
        return Err(GenerationError::Validation(
            "notes contain no readable text".to_string(),
        ));
    }
    let subject = request
        .subject
        .as_deref()
        .map(|subject| subject.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|subject| !subject.is_empty());

    Ok(ValidatedRequest {
        notes,
        count,
        filter,
        subject,
    })
}

/// Normalize notes before they are sent to a provider.
///
/// Line endings become `\n`, control characters other than tab are removed,
/// horizontal whitespace collapses to single spaces and consecutive blank
/// lines collapse to one.
pub fn clean_notes(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;
    for line in normalized.split('\n') {
        let visible: String = line
            .chars()
            .filter(|ch| !ch.is_control() || *ch == '\t')
            .collect();
        let collapsed = visible.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
        } else {
            lines.push(collapsed);
            previous_blank = false;
        }
    }
    lines.join("\n").trim().to_string()
}
