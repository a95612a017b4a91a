//! Turn raw provider text into candidate cards.
//!
//! Providers are asked for JSON but do not always comply. Structured output
//! is accepted as an object holding a card list, a bare array, or either of
//! those inside a Markdown fence. Anything else is read as `Q:`/`A:` blocks.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const QUESTION_KEYS: &[&str] = &["question", "front", "q", "prompt"];
const ANSWER_KEYS: &[&str] = &["answer", "back", "a", "response"];
const DIFFICULTY_KEYS: &[&str] = &["difficulty", "level"];
const CATEGORY_KEYS: &[&str] = &["category", "topic", "subject"];
const SOURCE_KEYS: &[&str] = &["source", "source_excerpt", "excerpt"];
const LIST_KEYS: &[&str] = &["cards", "flashcards", "items"];

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\n?(.*?)```").expect("fence regex")
});

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*]\s*)?(?:\d+[.)]\s*)?(?:\*\*)?(question|answer|difficulty|level|category|topic|source|confidence|q|a)(?:\*\*)?\s*:(?:\*\*)?\s*(.*)$",
    )
    .expect("label regex")
});

/// One card as the provider described it, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub question: String,
    pub answer: String,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
}

impl RawCard {
    fn is_usable(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Cards recovered from a completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOutput {
    /// Usable cards in provider order.
    pub cards: Vec<RawCard>,
    /// Items that lacked a question or answer.
    pub dropped: usize,
    /// Confidence the provider reported in its body, if any.
    pub confidence: Option<f32>,
}

impl ParsedOutput {
    fn push(&mut self, card: RawCard) {
        if card.is_usable() {
            self.cards.push(card);
        } else {
            self.dropped += 1;
        }
    }
}

/// Parse provider output, structured first and free text as a fallback.
pub fn parse_output(text: &str) -> ParsedOutput {
    parse_structured(text).unwrap_or_else(|| parse_free_text(text))
}

fn parse_structured(text: &str) -> Option<ParsedOutput> {
    let body = FENCE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or(text, |body| body.as_str())
        .trim();
    let value = serde_json::from_str::<Value>(body)
        .ok()
        .or_else(|| embedded_json(body))?;

    let mut parsed = ParsedOutput::default();
    // An object naming a card list is a card payload even when every item is unusable.
    let mut listed = false;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            parsed.confidence = map.get("confidence").and_then(number);
            if let Some(Value::Array(items)) = lookup(&map, LIST_KEYS) {
                listed = true;
                items.clone()
            } else if lookup(&map, QUESTION_KEYS).is_some() {
                vec![Value::Object(map)]
            } else {
                return None;
            }
        }
        _ => return None,
    };
    for item in items {
        match item {
            Value::Object(map) => parsed.push(card_from_object(&map)),
            _ => parsed.dropped += 1,
        }
    }
    // Bracketed spans in prose (`[1, 2]`, citations) parse as JSON but hold no cards.
    (listed || !parsed.cards.is_empty()).then_some(parsed)
}

/// Recover a JSON document wrapped in prose, e.g. `Here you go: {...}`.
fn embedded_json(text: &str) -> Option<Value> {
    let start = text.find(['{', '['])?;
    let end = text.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| keys.iter().any(|candidate| key.eq_ignore_ascii_case(candidate)))
        .map(|(_, value)| value)
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let text = match lookup(map, keys)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number(value: &Value) -> Option<f32> {
    match value {
        Value::Number(number) => number.as_f64().map(|n| n as f32),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn card_from_object(map: &Map<String, Value>) -> RawCard {
    RawCard {
        question: text_field(map, QUESTION_KEYS).unwrap_or_default(),
        answer: text_field(map, ANSWER_KEYS).unwrap_or_default(),
        difficulty: text_field(map, DIFFICULTY_KEYS),
        category: text_field(map, CATEGORY_KEYS),
        source: text_field(map, SOURCE_KEYS),
    }
}

#[derive(Clone, Copy)]
enum Field {
    Question,
    Answer,
}

fn parse_free_text(text: &str) -> ParsedOutput {
    let mut parsed = ParsedOutput::default();
    let mut current: Option<RawCard> = None;
    let mut last_field: Option<Field> = None;

    for line in text.lines() {
        let Some(captures) = LABEL.captures(line) else {
            let continuation = line.trim();
            if continuation.is_empty() {
                last_field = None;
            } else if let (Some(card), Some(field)) = (current.as_mut(), last_field) {
                let slot = match field {
                    Field::Question => &mut card.question,
                    Field::Answer => &mut card.answer,
                };
                slot.push(' ');
                slot.push_str(continuation);
            }
            continue;
        };
        let label = captures[1].to_ascii_lowercase();
        let value = captures[2].trim().trim_end_matches("**").trim().to_string();
        match label.as_str() {
            "q" | "question" => {
                if let Some(card) = current.take() {
                    parsed.push(card);
                }
                current = Some(RawCard {
                    question: value,
                    ..RawCard::default()
                });
                last_field = Some(Field::Question);
            }
            "a" | "answer" => {
                let card = current.get_or_insert_with(RawCard::default);
                if !card.answer.is_empty() {
                    card.answer.push(' ');
                }
                card.answer.push_str(&value);
                last_field = Some(Field::Answer);
            }
            "confidence" => {
                parsed.confidence = value.trim_end_matches('%').trim().parse::<f32>().ok().map(
                    |confidence| {
                        if value.ends_with('%') {
                            confidence / 100.0
                        } else {
                            confidence
                        }
                    },
                );
                last_field = None;
            }
            other => {
                if let Some(card) = current.as_mut() {
                    let slot = match other {
                        "difficulty" | "level" => &mut card.difficulty,
                        "category" | "topic" => &mut card.category,
                        _ => &mut card.source,
                    };
                    *slot = (!value.is_empty()).then_some(value);
                }
                last_field = None;
            }
        }
    }
    if let Some(card) = current {
        parsed.push(card);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn card(question: &str, answer: &str) -> RawCard {
        RawCard {
            question: question.to_string(),
            answer: answer.to_string(),
            ..RawCard::default()
        }
    }

    #[test]
    fn parses_object_with_cards() {
        let parsed = parse_output(
            r#"{"confidence": 0.8, "cards": [
                {"question": "What is ATP?", "answer": "Energy currency", "difficulty": "easy",
                 "category": "Biology", "source": "ATP stores energy."},
                {"question": "", "answer": "orphan"}
            ]}"#,
        );
        assert_eq!(parsed.confidence, Some(0.8));
        assert_eq!(parsed.dropped, 1);
        assert_eq!(
            parsed.cards,
            vec![RawCard {
                question: "What is ATP?".to_string(),
                answer: "Energy currency".to_string(),
                difficulty: Some("easy".to_string()),
                category: Some("Biology".to_string()),
                source: Some("ATP stores energy.".to_string()),
            }]
        );
    }

    #[test]
    fn parses_fenced_array_with_aliases() {
        let parsed = parse_output(
            "Sure! Here are your cards:\n```json\n[{\"Front\": \"2+2?\", \"Back\": 4}, 7]\n```\nGood luck.",
        );
        assert_eq!(parsed.cards, vec![card("2+2?", "4")]);
        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.confidence, None);
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let parsed = parse_output(
            "Here you go: {\"flashcards\": [{\"q\": \"Capital of France?\", \"a\": \"Paris\"}]} Enjoy",
        );
        assert_eq!(parsed.cards, vec![card("Capital of France?", "Paris")]);
    }

    #[test]
    fn single_card_object_is_accepted() {
        let parsed = parse_output(r#"{"question": "Define osmosis.", "answer": "Diffusion of water."}"#);
        assert_eq!(parsed.cards.len(), 1);
    }

    #[test]
    fn parses_free_text_blocks() {
        let parsed = parse_output(
            "Confidence: 70%\n\n\
             Q: What are mitochondria?\n\
             A: The powerhouse\n\
             of the cell.\n\
             Difficulty: easy\n\
             Category: Biology\n\n\
             2. **Question:** Why do cells divide?\n\
             **Answer:** To grow and repair tissue.\n\n\
             Q: Dangling question without answer\n",
        );
        assert_eq!(parsed.confidence, Some(0.7));
        assert_eq!(parsed.dropped, 1);
        assert_eq!(
            parsed.cards,
            vec![
                RawCard {
                    question: "What are mitochondria?".to_string(),
                    answer: "The powerhouse of the cell.".to_string(),
                    difficulty: Some("easy".to_string()),
                    category: Some("Biology".to_string()),
                    source: None,
                },
                card("Why do cells divide?", "To grow and repair tissue."),
            ]
        );
    }

    #[test]
    fn unparseable_text_yields_nothing() {
        let parsed = parse_output("I cannot help with that.");
        assert!(parsed.cards.is_empty());
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn bracketed_free_text_is_not_mistaken_for_json() {
        let parsed = parse_output(
            "Q: What does the list [1, 2] contain?\nA: Two integers.\n\n\
             Q: Which paper introduced it [3]?\nA: The {original} survey.\n",
        );
        assert_eq!(
            parsed.cards,
            vec![
                card("What does the list [1, 2] contain?", "Two integers."),
                card("Which paper introduced it [3]?", "The {original} survey."),
            ]
        );
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn listed_cards_without_usable_items_stay_structured() {
        let parsed = parse_output(r#"{"cards": [{"question": "Orphan?"}, 3]}"#);
        assert!(parsed.cards.is_empty());
        assert_eq!(parsed.dropped, 2);
    }

    #[test]
    fn object_without_cards_falls_back_to_free_text() {
        let parsed = parse_output(r#"{"error": "quota"}"#);
        assert!(parsed.cards.is_empty());
    }
}
