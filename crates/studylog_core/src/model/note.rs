//! Topic note model.
//!
//! # Responsibility
//! - Define the free-text document stored per topic.
//! - Normalize topic identifiers so they are usable as vault file names.
//!
//! # Invariants
//! - Topics are trimmed and restricted to `[A-Za-z0-9._-]`, never starting
//!   with `.`.
//! - Bodies are stored byte-exact.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static TOPIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]*$").expect("valid topic regex"));

/// One free-text reference document for a single topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDocument {
    pub topic: String,
    /// Long-form text. Code fragments inside are illustrative only.
    pub body: String,
}

impl NoteDocument {
    /// Builds a document after normalizing and validating `topic`.
    pub fn new(topic: &str, body: impl Into<String>) -> Result<Self, NoteValidationError> {
        Ok(Self {
            topic: normalize_topic(topic)?,
            body: body.into(),
        })
    }
}

/// Result of an upsert against the note index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// Body was identical; nothing was written.
    Unchanged,
}

/// Trims and validates a topic identifier.
pub fn normalize_topic(topic: &str) -> Result<String, NoteValidationError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(NoteValidationError::EmptyTopic);
    }
    if !TOPIC_RE.is_match(trimmed) {
        return Err(NoteValidationError::InvalidTopic(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Validation failures for note topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTopic,
    InvalidTopic(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTopic => write!(f, "note topic cannot be empty"),
            Self::InvalidTopic(value) => write!(
                f,
                "invalid note topic `{value}`; allowed characters are letters, digits, `.`, `_`, `-`"
            ),
        }
    }
}

impl Error for NoteValidationError {}

#[cfg(test)]
mod tests {
    use super::{normalize_topic, NoteDocument, NoteValidationError};

    #[test]
    fn normalize_topic_trims_and_keeps_case() {
        assert_eq!(normalize_topic("  Python-Core ").unwrap(), "Python-Core");
    }

    #[test]
    fn normalize_topic_rejects_paths_and_hidden_names() {
        assert_eq!(normalize_topic("   "), Err(NoteValidationError::EmptyTopic));
        assert!(matches!(
            normalize_topic("../etc"),
            Err(NoteValidationError::InvalidTopic(_))
        ));
        assert!(normalize_topic(".hidden").is_err());
        assert!(normalize_topic("rust basics").is_err());
    }

    #[test]
    fn new_keeps_body_verbatim() {
        let note = NoteDocument::new("golang-basics", "  body\n\n").unwrap();
        assert_eq!(note.body, "  body\n\n");
    }
}
