//! Flashcard generation pipeline.

use crate::classify::{classify_category, classify_difficulty, select_excerpt};
use crate::error::GenerationError;
use crate::parse::{RawCard, parse_output};
use crate::prompt::build_prompt;
use crate::retry::{RetryPolicy, complete_with_retry};
use crate::validate::{ValidatedRequest, validate_request};
use cardsmith_config::{CardsmithConfig, DifficultyPolicy, GenerationConfig};
use cardsmith_protocol::{
    FlashcardDraft, GenerationMetadata, GenerationRequest, GenerationResult, TextProvider,
};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Turns notes into classified flashcard drafts through a [`TextProvider`].
///
/// The generator holds no per-request state and can be shared freely.
#[derive(Clone)]
pub struct FlashcardGenerator {
    provider: Arc<dyn TextProvider>,
    generation: GenerationConfig,
    retry: RetryPolicy,
}

impl FlashcardGenerator {
    pub fn new(provider: Arc<dyn TextProvider>, config: &CardsmithConfig) -> Self {
        Self {
            provider,
            generation: config.generation.clone(),
            retry: RetryPolicy::from_config(&config.provider),
        }
    }

    /// Deployment-wide cap on cards per request.
    pub fn max_cards_per_request(&self) -> usize {
        self.generation.max_cards_per_request
    }

    /// Generate cards for `request`.
    ///
    /// `ceiling` is the caller's own per-request limit, usually from their
    /// plan. The effective limit is the smaller of it and the configured cap.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        ceiling: usize,
    ) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();
        let ceiling = ceiling.min(self.generation.max_cards_per_request);
        let validated =
            validate_request(request, ceiling, self.generation.max_notes_chars).inspect_err(
                |err| debug!("rejected generation request (error={})", err),
            )?;
        info!(
            "generating flashcards (count={}, difficulty={}, subject_set={}, notes_chars={})",
            validated.count,
            validated.filter,
            validated.subject.is_some(),
            validated.notes.chars().count()
        );

        let prompt = build_prompt(&validated);
        let completion = complete_with_retry(self.provider.as_ref(), &prompt, &self.retry).await?;
        let parsed = parse_output(&completion.text);
        let mut dropped = parsed.dropped;
        if parsed.cards.is_empty() {
            warn!(
                "provider returned no usable flashcards (response_chars={}, dropped={})",
                completion.text.chars().count(),
                dropped
            );
            return Err(GenerationError::Provider(
                "provider returned no usable flashcards".to_string(),
            ));
        }

        let mut cards: Vec<FlashcardDraft> = parsed
            .cards
            .into_iter()
            .map(|raw| self.shape(raw, &validated))
            .collect();

        if let Some(target) = validated.filter.target() {
            match self.generation.difficulty_policy {
                DifficultyPolicy::Relabel => {
                    for card in &mut cards {
                        card.difficulty = target;
                    }
                }
                DifficultyPolicy::Constrain => {
                    let before = cards.len();
                    cards.retain(|card| card.difficulty == target);
                    dropped += before - cards.len();
                }
            }
        }
        if cards.len() > validated.count {
            dropped += cards.len() - validated.count;
            cards.truncate(validated.count);
        }

        let confidence = completion
            .confidence
            .filter(|value| value.is_finite())
            .or(parsed.confidence.filter(|value| value.is_finite()))
            .map_or(self.generation.default_confidence, |value| {
                value.clamp(0.0, 1.0)
            });
        let model = completion
            .model
            .unwrap_or_else(|| self.provider.model_id().to_string());
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            "generated flashcards (requested={}, kept={}, dropped={}, duration_ms={})",
            validated.count,
            cards.len(),
            dropped,
            duration_ms
        );
        Ok(GenerationResult {
            cards,
            metadata: GenerationMetadata {
                duration_ms,
                model,
                confidence,
                requested: validated.count,
                dropped,
            },
        })
    }

    fn shape(&self, raw: RawCard, request: &ValidatedRequest) -> FlashcardDraft {
        let question = raw.question.trim().to_string();
        let answer = raw.answer.trim().to_string();
        let difficulty = classify_difficulty(raw.difficulty.as_deref(), &question, &answer);
        let source_excerpt = select_excerpt(
            raw.source.as_deref(),
            &request.notes,
            &question,
            &answer,
            self.generation.excerpt_max_chars,
        );
        let category = classify_category(
            raw.category.as_deref(),
            request.subject.as_deref(),
            &[question.as_str(), answer.as_str(), source_excerpt.as_str()],
        );
        FlashcardDraft {
            question,
            answer,
            difficulty,
            category,
            source_excerpt,
        }
    }
}

impl std::fmt::Debug for FlashcardGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashcardGenerator")
            .field("model", &self.provider.model_id())
            .field("generation", &self.generation)
            .field("retry", &self.retry)
            .finish()
    }
}
