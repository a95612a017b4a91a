//! Instruction prompt sent to the text provider.

use crate::validate::ValidatedRequest;
use cardsmith_protocol::DifficultyFilter;

const RESPONSE_FORMAT: &str = r#"Respond with JSON only, in exactly this shape:
{
  "confidence": <number between 0 and 1>,
  "cards": [
    {
      "question": "<question>",
      "answer": "<answer>",
      "difficulty": "easy" | "medium" | "hard",
      "category": "<short topic label>",
      "source": "<the sentence from the notes this card is based on>"
    }
  ]
}"#;

/// Build the generation prompt for a validated request.
pub fn build_prompt(request: &ValidatedRequest) -> String {
    let plural = if request.count == 1 { "" } else { "s" };
    let difficulty = match request.filter {
        DifficultyFilter::Mixed => "use a mix of easy, medium and hard cards".to_string(),
        filter => format!("every card should be {filter}"),
    };
    let subject = request
        .subject
        .as_deref()
        .unwrap_or("infer it from the notes");

    format!(
        "You write study flashcards from a learner's notes.\n\
         Create exactly {count} flashcard{plural}.\n\
         Difficulty: {difficulty}.\n\
         Subject: {subject}.\n\
         Each card asks one question that the notes answer. Keep answers short and self-contained.\n\
         {RESPONSE_FORMAT}\n\n\
         Notes:\n<<<\n{notes}\n>>>\n",
        count = request.count,
        notes = request.notes,
    )
}
