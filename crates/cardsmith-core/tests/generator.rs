//! End-to-end behavior of the generation pipeline against fake providers.

use cardsmith_config::{
    CardsmithConfig, DifficultyPolicy, GenerationConfig, ProviderConfig,
};
use cardsmith_core::{FlashcardGenerator, GenerationError};
use cardsmith_protocol::{Completion, Difficulty, GenerationRequest, ProviderFailure};
use cardsmith_test_utils::{
    FailingProvider, FixedProvider, MITOCHONDRIA_NOTES, ScriptedProvider, SlowProvider,
    mitochondria_response,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn config(policy: DifficultyPolicy) -> CardsmithConfig {
    CardsmithConfig::builder()
        .generation(GenerationConfig {
            difficulty_policy: policy,
            ..GenerationConfig::default()
        })
        .provider(ProviderConfig {
            timeout_ms: 1_000,
            max_retries: 2,
            backoff_ms: 10,
            ..ProviderConfig::default()
        })
        .build()
}

const THREE_CARDS: &str = r#"```json
{
  "cards": [
    {"question": "Who discovered penicillin?", "answer": "Alexander Fleming", "difficulty": "easy"},
    {"question": "Explain how penicillin kills bacteria.", "answer": "It blocks cell wall synthesis.", "difficulty": "hard"},
    {"question": "What year was penicillin discovered?", "answer": "1928", "difficulty": "medium"},
    {"question": "", "answer": "dangling"}
  ]
}
```"#;

#[tokio::test]
async fn mitochondria_example_yields_one_card() {
    let provider = Arc::new(FixedProvider::new(mitochondria_response()).with_model("gpt-test"));
    let generator = FlashcardGenerator::new(provider.clone(), &config(DifficultyPolicy::Relabel));

    let result = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "mixed"), 20)
        .await
        .expect("generation");

    assert_eq!(result.cards.len(), 1);
    let card = &result.cards[0];
    assert_eq!(card.question, "What are mitochondria known as?");
    assert_eq!(
        card.answer,
        "The powerhouse of the cell, producing the cell's energy."
    );
    assert_eq!(card.difficulty, Difficulty::Easy);
    assert_eq!(card.category, "biology");
    assert_eq!(card.source_excerpt, MITOCHONDRIA_NOTES);
    assert_eq!(result.metadata.model, "gpt-test");
    assert_eq!(result.metadata.requested, 1);
    assert_eq!(result.metadata.dropped, 0);
    assert!((result.metadata.confidence - 0.92).abs() < f32::EPSILON);
    assert_eq!(provider.calls(), 1);
    let prompt = provider.last_prompt().expect("prompt");
    assert!(prompt.contains(MITOCHONDRIA_NOTES));
}

#[tokio::test]
async fn empty_notes_never_reach_the_provider() {
    let provider = Arc::new(FixedProvider::new(mitochondria_response()));
    let generator = FlashcardGenerator::new(provider.clone(), &config(DifficultyPolicy::Relabel));

    let err = generator
        .generate(&GenerationRequest::new("   \n ", 3, "mixed"), 20)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Validation(_)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn plan_ceiling_caps_count() {
    let provider = Arc::new(FixedProvider::new(mitochondria_response()));
    let generator = FlashcardGenerator::new(provider.clone(), &config(DifficultyPolicy::Relabel));

    let err = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 11, "mixed"), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Validation(ref message) if message.contains("limit of 10")));

    let err = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 21, "mixed"), 50)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Validation(ref message) if message.contains("limit of 20")));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn easy_filter_relabels_every_card() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new(THREE_CARDS)),
        &config(DifficultyPolicy::Relabel),
    );

    let result = generator
        .generate(&GenerationRequest::new("Penicillin notes.", 3, "Easy"), 20)
        .await
        .expect("generation");

    assert_eq!(result.cards.len(), 3);
    assert!(result.cards.iter().all(|card| card.difficulty == Difficulty::Easy));
    assert_eq!(result.metadata.dropped, 1);
}

#[tokio::test]
async fn easy_filter_under_constrain_drops_mismatches() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new(THREE_CARDS)),
        &config(DifficultyPolicy::Constrain),
    );

    let result = generator
        .generate(&GenerationRequest::new("Penicillin notes.", 3, "easy"), 20)
        .await
        .expect("generation");

    let questions: Vec<&str> = result
        .cards
        .iter()
        .map(|card| card.question.as_str())
        .collect();
    assert_eq!(questions, vec!["Who discovered penicillin?"]);
    assert_eq!(result.metadata.dropped, 3);
}

#[tokio::test]
async fn constrain_may_return_no_cards() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new(mitochondria_response())),
        &config(DifficultyPolicy::Constrain),
    );

    let result = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "hard"), 20)
        .await
        .expect("generation");

    assert!(result.cards.is_empty());
}

#[tokio::test]
async fn extra_cards_are_truncated_in_order() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new(THREE_CARDS)),
        &config(DifficultyPolicy::Relabel),
    );

    let result = generator
        .generate(&GenerationRequest::new("Penicillin notes.", 2, "mixed"), 20)
        .await
        .expect("generation");

    assert_eq!(result.cards.len(), 2);
    assert_eq!(result.cards[0].question, "Who discovered penicillin?");
    assert_eq!(result.cards[1].difficulty, Difficulty::Hard);
    assert_eq!(result.metadata.dropped, 2);
}

#[tokio::test]
async fn subject_hint_fills_missing_category() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new("Q: Who discovered penicillin?\nA: Alexander Fleming")),
        &config(DifficultyPolicy::Relabel),
    );

    let result = generator
        .generate(
            &GenerationRequest::new("Penicillin was discovered in 1928.", 1, "mixed")
                .with_subject("Medicine"),
            20,
        )
        .await
        .expect("generation");

    assert_eq!(result.cards[0].category, "medicine");
    assert_eq!(result.cards[0].difficulty, Difficulty::Easy);
    assert_eq!(
        result.cards[0].source_excerpt,
        "Penicillin was discovered in 1928."
    );
}

#[tokio::test]
async fn unusable_output_is_a_provider_error() {
    let provider = Arc::new(FixedProvider::new("Sorry, I cannot help with that."));
    let generator = FlashcardGenerator::new(provider.clone(), &config(DifficultyPolicy::Relabel));

    let err = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "mixed"), 20)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Provider(_)));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(ProviderFailure::new("503 from upstream")),
        Ok(Completion::from_text(mitochondria_response())),
    ]));
    let generator = FlashcardGenerator::new(provider.clone(), &config(DifficultyPolicy::Relabel));

    let result = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "mixed"), 20)
        .await
        .expect("generation");

    assert_eq!(result.cards.len(), 1);
    assert_eq!(result.metadata.model, "scripted-model");
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn persistent_failures_surface_after_retries() {
    let provider = Arc::new(FailingProvider::new("503 from upstream"));
    let generator = FlashcardGenerator::new(provider.clone(), &config(DifficultyPolicy::Relabel));

    let err = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "mixed"), 20)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Provider(ref message) if message == "503 from upstream"));
    assert_eq!(provider.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn timeout_returns_no_partial_result() {
    let provider = Arc::new(SlowProvider::new(
        Duration::from_secs(5),
        mitochondria_response(),
    ));
    let generator = FlashcardGenerator::new(provider.clone(), &config(DifficultyPolicy::Relabel));

    let err = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "mixed"), 20)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Timeout(limit) if limit == Duration::from_secs(1)));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn provider_confidence_wins_and_is_clamped() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new(mitochondria_response()).with_confidence(1.7)),
        &config(DifficultyPolicy::Relabel),
    );

    let result = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "mixed"), 20)
        .await
        .expect("generation");

    assert_eq!(result.metadata.confidence, 1.0);
}

#[tokio::test]
async fn non_finite_provider_confidence_falls_back_to_body() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new(mitochondria_response()).with_confidence(f32::NAN)),
        &config(DifficultyPolicy::Relabel),
    );

    let result = generator
        .generate(&GenerationRequest::new(MITOCHONDRIA_NOTES, 1, "mixed"), 20)
        .await
        .expect("generation");

    assert!((result.metadata.confidence - 0.92).abs() < f32::EPSILON);
}

#[tokio::test]
async fn missing_confidence_uses_default() {
    let generator = FlashcardGenerator::new(
        Arc::new(FixedProvider::new(
            r#"[{"question": "What is ATP?", "answer": "Energy currency"}]"#,
        )),
        &config(DifficultyPolicy::Relabel),
    );

    let result = generator
        .generate(&GenerationRequest::new("ATP stores energy.", 1, "mixed"), 20)
        .await
        .expect("generation");

    assert_eq!(result.metadata.confidence, 0.5);
    assert_eq!(result.metadata.model, "fixed-model");
}
