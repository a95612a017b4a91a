use cardsmith_protocol::{Difficulty, FlashcardDraft};

pub const MITOCHONDRIA_NOTES: &str = "Mitochondria are the powerhouse of the cell.";

/// A complete draft with the given text sides.
pub fn draft(question: &str, answer: &str) -> FlashcardDraft {
    FlashcardDraft {
        question: question.to_string(),
        answer: answer.to_string(),
        difficulty: Difficulty::Medium,
        category: "biology".to_string(),
        source_excerpt: MITOCHONDRIA_NOTES.to_string(),
    }
}

/// Structured provider output for [`MITOCHONDRIA_NOTES`] with one card.
pub fn mitochondria_response() -> String {
    r#"{
  "confidence": 0.92,
  "cards": [
    {
      "question": "What are mitochondria known as?",
      "answer": "The powerhouse of the cell, producing the cell's energy.",
      "difficulty": "easy",
      "category": "Biology"
    }
  ]
}"#
    .to_string()
}
