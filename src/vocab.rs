//! Chat vocabulary loader — word lists from YAML.
//!
//! Single consolidated loader for the assistant's word-list data: status
//! phrase sets (strict and loose), difficulty synonym sets, the attribute
//! stop-keywords that terminate free-text captures, and the fallback
//! message pool.
//!
//! Uses the standard disk-first + `include_str!` fallback pattern.

use serde::Deserialize;
use std::sync::OnceLock;

use crate::types::{Difficulty, TaskStatus};

// ---------------------------------------------------------------------------
// Embedded fallback
// ---------------------------------------------------------------------------

const EMBEDDED_VOCAB: &str = include_str!("../data/chat/chat_vocab.yaml");

// ---------------------------------------------------------------------------
// YAML schema types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VocabYaml {
    status_phrases: Vec<StatusEntry>,
    status_loose: Vec<StatusEntry>,
    difficulty_words: Vec<DifficultyEntry>,
    attribute_stops: Vec<String>,
    fallbacks: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    status: TaskStatus,
    phrases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DifficultyEntry {
    difficulty: Difficulty,
    words: Vec<String>,
}

// ---------------------------------------------------------------------------
// Runtime vocabulary
// ---------------------------------------------------------------------------

/// Loaded chat vocabulary. List order is significant: status and difficulty
/// sets are tested in the order they appear in the YAML.
#[derive(Debug)]
pub struct ChatVocab {
    /// Phrases recognized after an explicit "to ..." status marker.
    pub status_phrases: Vec<(TaskStatus, Vec<String>)>,
    /// Wider synonym sets for the whole-text containment fallback.
    pub status_loose: Vec<(TaskStatus, Vec<String>)>,
    /// Difficulty synonym sets, tested EASY → EPIC.
    pub difficulty_words: Vec<(Difficulty, Vec<String>)>,
    /// Keywords that end a tracker-name or title capture.
    pub attribute_stops: Vec<String>,
    /// Replies used when no rule matches.
    pub fallbacks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Singleton
// ---------------------------------------------------------------------------

static VOCAB: OnceLock<ChatVocab> = OnceLock::new();

/// Get the loaded chat vocabulary (singleton, loaded on first call).
pub fn vocab() -> &'static ChatVocab {
    VOCAB.get_or_init(load_vocab)
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

fn load_vocab() -> ChatVocab {
    // Disk-first, embedded fallback
    let yaml_str = std::fs::read_to_string("data/chat/chat_vocab.yaml")
        .ok()
        .unwrap_or_else(|| EMBEDDED_VOCAB.to_string());

    parse_vocab(&yaml_str).unwrap_or_else(|e| {
        log::warn!("failed to parse chat_vocab.yaml from disk ({}), using embedded", e);
        parse_vocab(EMBEDDED_VOCAB).expect("embedded chat_vocab.yaml must parse")
    })
}

fn parse_vocab(yaml_str: &str) -> Result<ChatVocab, String> {
    let raw: VocabYaml =
        serde_yaml::from_str(yaml_str).map_err(|e| format!("YAML parse error: {}", e))?;

    if raw.fallbacks.is_empty() {
        return Err("fallback pool must not be empty".to_string());
    }

    Ok(ChatVocab {
        status_phrases: raw
            .status_phrases
            .into_iter()
            .map(|e| (e.status, e.phrases))
            .collect(),
        status_loose: raw
            .status_loose
            .into_iter()
            .map(|e| (e.status, e.phrases))
            .collect(),
        difficulty_words: raw
            .difficulty_words
            .into_iter()
            .map(|e| (e.difficulty, e.words))
            .collect(),
        attribute_stops: raw.attribute_stops,
        fallbacks: raw.fallbacks,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_loads() {
        let v = vocab();
        assert!(!v.status_phrases.is_empty());
        assert!(!v.status_loose.is_empty());
        assert!(!v.difficulty_words.is_empty());
        assert!(!v.attribute_stops.is_empty());
        assert!(!v.fallbacks.is_empty());
    }

    #[test]
    fn test_difficulty_order_easy_to_epic() {
        let v = vocab();
        let order: Vec<Difficulty> = v.difficulty_words.iter().map(|(d, _)| *d).collect();
        assert_eq!(
            order,
            vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Epic]
        );
    }

    #[test]
    fn test_loose_status_has_extra_synonyms() {
        let v = vocab();
        let in_progress = v
            .status_loose
            .iter()
            .find(|(s, _)| *s == TaskStatus::InProgress)
            .expect("IN_PROGRESS entry");
        for word in ["doing", "started", "improve", "broken"] {
            assert!(
                in_progress.1.iter().any(|p| p == word),
                "loose IN_PROGRESS should include {:?}",
                word
            );
        }
        let completed = v
            .status_loose
            .iter()
            .find(|(s, _)| *s == TaskStatus::Completed)
            .expect("COMPLETED entry");
        assert!(completed.1.iter().any(|p| p == "finished"));
    }

    #[test]
    fn test_attribute_stops_cover_grammar_keywords() {
        let v = vocab();
        for kw in ["due", "today", "tomorrow", "and"] {
            assert!(v.attribute_stops.iter().any(|s| s == kw), "missing stop {:?}", kw);
        }
    }

    #[test]
    fn test_parse_embedded_always_works() {
        let result = parse_vocab(EMBEDDED_VOCAB);
        assert!(result.is_ok(), "embedded vocab must parse: {:?}", result.err());
    }

    #[test]
    fn test_parse_malformed_yaml_returns_error() {
        assert!(parse_vocab("not: valid: yaml: [[[").is_err());
    }

    #[test]
    fn test_empty_fallback_pool_rejected() {
        let yaml = r#"
status_phrases: []
status_loose: []
difficulty_words: []
attribute_stops: []
fallbacks: []
"#;
        assert!(parse_vocab(yaml).is_err());
    }
}
