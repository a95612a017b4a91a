//! Difficulty, category and source excerpt for generated cards.
//!
//! All rules are deterministic so the same provider output always produces
//! the same cards.

use cardsmith_protocol::{Difficulty, UNCATEGORIZED};
use std::collections::HashSet;

const CATEGORY_MAX_CHARS: usize = 40;

const EASY_OPENERS: &[&str] = &[
    "what is",
    "what are",
    "who",
    "when",
    "where",
    "define",
    "name",
    "which",
    "true or false",
];

const HARD_WORDS: &[&str] = &[
    "why",
    "explain",
    "compare",
    "contrast",
    "analyze",
    "analyse",
    "evaluate",
    "derive",
    "justify",
    "predict",
    "distinguish",
    "relationship",
];

const HARD_PHRASES: &[&str] = &["how does", "how do"];

const SHORT_ANSWER_WORDS: usize = 6;
const LONG_ANSWER_WORDS: usize = 25;

const TOPICS: &[(&str, &[&str])] = &[
    (
        "biology",
        &[
            "cell", "cells", "mitochondria", "dna", "rna", "gene", "genes", "protein",
            "proteins", "enzyme", "enzymes", "organism", "organisms", "species", "evolution",
            "photosynthesis", "membrane", "tissue", "organ",
        ],
    ),
    (
        "chemistry",
        &[
            "atom", "atoms", "molecule", "molecules", "reaction", "reactions", "acid", "acids",
            "bond", "bonds", "element", "elements", "compound", "compounds", "ion", "ions",
            "catalyst", "oxidation", "periodic",
        ],
    ),
    (
        "physics",
        &[
            "force", "forces", "velocity", "mass", "acceleration", "gravity", "momentum",
            "quantum", "newton", "friction", "wave", "waves", "electron", "electrons",
            "relativity", "voltage",
        ],
    ),
    (
        "mathematics",
        &[
            "equation", "equations", "theorem", "integral", "derivative", "algebra",
            "geometry", "matrix", "prime", "proof", "calculus", "polynomial", "triangle",
            "probability",
        ],
    ),
    (
        "history",
        &[
            "war", "empire", "revolution", "century", "treaty", "dynasty", "king", "queen",
            "president", "ancient", "independence", "colonial", "medieval", "battle",
        ],
    ),
    (
        "computer science",
        &[
            "algorithm", "algorithms", "program", "compiler", "database", "software",
            "recursion", "variable", "function", "functions", "network", "binary", "cpu",
            "memory", "code",
        ],
    ),
    (
        "geography",
        &[
            "river", "rivers", "mountain", "mountains", "continent", "climate", "country",
            "capital", "ocean", "population", "latitude", "longitude", "desert",
        ],
    ),
    (
        "economics",
        &[
            "market", "markets", "price", "prices", "supply", "demand", "inflation", "gdp",
            "trade", "tax", "monetary", "economy", "interest",
        ],
    ),
    (
        "literature",
        &[
            "novel", "poem", "poetry", "author", "character", "characters", "metaphor",
            "narrative", "shakespeare", "theme", "plot", "stanza",
        ],
    ),
];

/// Map a provider difficulty label, including common synonyms.
pub fn parse_difficulty_label(label: &str) -> Option<Difficulty> {
    match label.trim().to_ascii_lowercase().as_str() {
        "easy" | "beginner" | "basic" | "simple" => Some(Difficulty::Easy),
        "medium" | "intermediate" | "moderate" => Some(Difficulty::Medium),
        "hard" | "advanced" | "difficult" | "challenging" | "expert" => Some(Difficulty::Hard),
        _ => None,
    }
}

/// Decide a card's difficulty.
///
/// A recognized label wins. A label that is present but unknown falls back
/// to medium. Without a label the question and answer are scored.
pub fn classify_difficulty(label: Option<&str>, question: &str, answer: &str) -> Difficulty {
    match label.map(str::trim).filter(|label| !label.is_empty()) {
        Some(label) => parse_difficulty_label(label).unwrap_or(Difficulty::Medium),
        None => heuristic_difficulty(question, answer),
    }
}

/// Score a card from its wording.
///
/// Recall openers and short answers pull toward easy; reasoning cues and
/// long answers pull toward hard. A score of -1 or lower is easy, 2 or
/// higher is hard.
pub fn heuristic_difficulty(question: &str, answer: &str) -> Difficulty {
    let question = question.trim().to_lowercase();
    let question_words = words(&question);
    let answer_words = answer.split_whitespace().count();

    let mut score = 0i32;
    if EASY_OPENERS
        .iter()
        .any(|opener| starts_with_phrase(&question, opener))
    {
        score -= 1;
    }
    if answer_words <= SHORT_ANSWER_WORDS {
        score -= 1;
    }
    if question_words
        .iter()
        .any(|word| HARD_WORDS.contains(&word.as_str()))
        || HARD_PHRASES.iter().any(|phrase| question.contains(phrase))
    {
        score += 1;
    }
    if answer_words >= LONG_ANSWER_WORDS {
        score += 1;
    }

    match score {
        i32::MIN..=-1 => Difficulty::Easy,
        2.. => Difficulty::Hard,
        _ => Difficulty::Medium,
    }
}

fn starts_with_phrase(text: &str, phrase: &str) -> bool {
    text.strip_prefix(phrase)
        .is_some_and(|rest| rest.chars().next().is_none_or(|ch| !ch.is_alphanumeric()))
}

/// Lowercase, collapse whitespace and cap a category label.
pub fn normalize_category(label: &str) -> Option<String> {
    let collapsed = label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let truncated = truncate_chars(&collapsed, CATEGORY_MAX_CHARS);
    (!truncated.is_empty()).then_some(truncated)
}

/// Decide a card's category: provider label, then subject, then topic table.
pub fn classify_category(label: Option<&str>, subject: Option<&str>, texts: &[&str]) -> String {
    label
        .and_then(normalize_category)
        .or_else(|| subject.and_then(normalize_category))
        .or_else(|| topic_for(texts).map(str::to_string))
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Best-scoring topic for the given texts. Ties go to the earlier topic.
pub fn topic_for(texts: &[&str]) -> Option<&'static str> {
    let tokens: Vec<String> = texts
        .iter()
        .flat_map(|text| words(&text.to_lowercase()))
        .collect();
    let mut best: Option<(&'static str, usize)> = None;
    for &(topic, keywords) in TOPICS {
        let score = tokens
            .iter()
            .filter(|token| keywords.contains(&token.as_str()))
            .count();
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((topic, score));
        }
    }
    best.map(|(topic, _)| topic)
}

/// Pick the notes text a card was drawn from.
///
/// Uses the provider's source when it gave one, otherwise the notes sentence
/// sharing the most content words with the card, otherwise the start of the
/// notes.
pub fn select_excerpt(
    source: Option<&str>,
    notes: &str,
    question: &str,
    answer: &str,
    max_chars: usize,
) -> String {
    if let Some(source) = source {
        let source = source.split_whitespace().collect::<Vec<_>>().join(" ");
        if !source.is_empty() {
            return truncate_chars(&source, max_chars);
        }
    }

    let card_words: HashSet<String> = content_words(&format!("{question} {answer}"));
    let mut best: Option<(&str, usize)> = None;
    for sentence in sentences(notes) {
        let overlap = content_words(sentence)
            .iter()
            .filter(|word| card_words.contains(*word))
            .count();
        if overlap > 0 && best.is_none_or(|(_, top)| overlap > top) {
            best = Some((sentence, overlap));
        }
    }
    let excerpt = best.map_or(notes, |(sentence, _)| sentence);
    truncate_chars(
        &excerpt.split_whitespace().collect::<Vec<_>>().join(" "),
        max_chars,
    )
}

/// First `max` characters of `text`, without trailing whitespace.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => text[..index].trim_end().to_string(),
        None => text.to_string(),
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn content_words(text: &str) -> HashSet<String> {
    words(&text.to_lowercase())
        .into_iter()
        .filter(|word| word.chars().count() > 3)
        .collect()
}

fn sentences(notes: &str) -> impl Iterator<Item = &str> {
    notes
        .split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labels_and_synonyms() {
        assert_eq!(parse_difficulty_label("EASY"), Some(Difficulty::Easy));
        assert_eq!(parse_difficulty_label(" beginner "), Some(Difficulty::Easy));
        assert_eq!(parse_difficulty_label("moderate"), Some(Difficulty::Medium));
        assert_eq!(parse_difficulty_label("Challenging"), Some(Difficulty::Hard));
        assert_eq!(parse_difficulty_label("spicy"), None);
    }

    #[test]
    fn unknown_label_defaults_to_medium() {
        assert_eq!(
            classify_difficulty(Some("spicy"), "What is ATP?", "Energy."),
            Difficulty::Medium
        );
    }

    #[test]
    fn blank_label_uses_heuristic() {
        assert_eq!(
            classify_difficulty(Some("  "), "What is ATP?", "Energy currency."),
            Difficulty::Easy
        );
    }

    #[test]
    fn heuristic_recall_question_is_easy() {
        assert_eq!(
            heuristic_difficulty("Who wrote Hamlet?", "William Shakespeare"),
            Difficulty::Easy
        );
    }

    #[test]
    fn heuristic_reasoning_question_with_long_answer_is_hard() {
        let answer = "Because the inner membrane folds increase surface area, more electron \
                      transport chains fit in each mitochondrion, which raises the amount of ATP \
                      the organelle can produce per unit of time.";
        assert_eq!(
            heuristic_difficulty("Explain why cristae matter for respiration.", answer),
            Difficulty::Hard
        );
    }

    #[test]
    fn heuristic_middle_ground_is_medium() {
        assert_eq!(
            heuristic_difficulty(
                "How does osmosis move water?",
                "Water crosses a membrane toward the higher solute concentration."
            ),
            Difficulty::Medium
        );
    }

    #[test]
    fn opener_must_be_a_whole_phrase() {
        assert!(starts_with_phrase("who wrote it?", "who"));
        assert!(!starts_with_phrase("whom did it affect?", "who"));
    }

    #[test]
    fn category_prefers_label_then_subject() {
        assert_eq!(
            classify_category(Some("  Cell   Biology "), Some("science"), &[]),
            "cell biology"
        );
        assert_eq!(classify_category(None, Some("World History"), &[]), "world history");
        assert_eq!(classify_category(Some(""), None, &["Why did the empire fall?"]), "history");
        assert_eq!(classify_category(None, None, &["Hello there"]), UNCATEGORIZED);
    }

    #[test]
    fn category_label_is_capped() {
        let label = "a".repeat(60);
        assert_eq!(classify_category(Some(&label), None, &[]).chars().count(), 40);
    }

    #[test]
    fn topic_ties_go_to_table_order() {
        assert_eq!(topic_for(&["cell atom"]), Some("biology"));
        assert_eq!(topic_for(&["atom atoms cell"]), Some("chemistry"));
    }

    #[test]
    fn excerpt_prefers_provider_source() {
        assert_eq!(
            select_excerpt(Some("  ATP   stores energy. "), "notes", "q", "a", 240),
            "ATP stores energy."
        );
    }

    #[test]
    fn excerpt_picks_best_matching_sentence() {
        let notes = "Cells divide by mitosis. Mitochondria are the powerhouse of the cell! \
                     Ribosomes build proteins.";
        assert_eq!(
            select_excerpt(None, notes, "What are mitochondria?", "The powerhouse.", 240),
            "Mitochondria are the powerhouse of the cell!"
        );
    }

    #[test]
    fn excerpt_falls_back_to_notes_start() {
        assert_eq!(
            select_excerpt(None, "Alpha beta gamma delta.", "Why?", "No.", 10),
            "Alpha beta"
        );
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
