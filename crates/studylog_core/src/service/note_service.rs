//! Note index use-case service.
//!
//! # Responsibility
//! - Provide get/upsert/append/list APIs for topic notes.
//! - Derive plain-text previews from Markdown bodies.
//!
//! # Invariants
//! - `upsert` then `get` returns the body byte-for-byte.
//! - `upsert` with an identical body is a no-op reported as `Unchanged`.
//! - Bodies are never written to logs; only topic and byte length are.

use crate::model::note::{normalize_topic, NoteDocument, NoteValidationError, UpsertOutcome};
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PREVIEW_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// No document exists for the topic.
    NotFound(String),
    Validation(NoteValidationError),
    Repo(RepoError),
    /// Write succeeded but the read-back did not find the document.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(topic) => write!(f, "note not found: {topic}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Note(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Topic plus a short plain-text preview of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub topic: String,
    pub preview_text: Option<String>,
}

/// Note index facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gets the document for `topic`.
    ///
    /// # Errors
    /// - `NotFound` when the topic is absent.
    /// - `Validation` when `topic` is not a valid identifier.
    pub fn get(&self, topic: &str) -> NoteServiceResult<NoteDocument> {
        let topic = normalize_topic(topic)?;
        self.repo
            .get_note(&topic)?
            .ok_or(NoteServiceError::NotFound(topic))
    }

    /// Creates or replaces the document for `topic`.
    pub fn upsert(&self, topic: &str, body: impl Into<String>) -> NoteServiceResult<UpsertOutcome> {
        let note = NoteDocument::new(topic, body)?;
        let outcome = self.repo.upsert_note(&note)?;
        info!(
            "event=note_upsert module=note_service status=ok topic={} outcome={:?} body_bytes={}",
            note.topic,
            outcome,
            note.body.len()
        );
        Ok(outcome)
    }

    /// Appends `text` to an existing document, separated by a blank line.
    pub fn append(&self, topic: &str, text: &str) -> NoteServiceResult<NoteDocument> {
        let mut note = self.get(topic)?;
        append_paragraph(&mut note.body, text);
        self.repo.upsert_note(&note)?;
        info!(
            "event=note_append module=note_service status=ok topic={} appended_bytes={}",
            note.topic,
            text.len()
        );

        self.repo
            .get_note(&note.topic)?
            .ok_or(NoteServiceError::InconsistentState(
                "appended note not found in read-back",
            ))
    }

    pub fn list_topics(&self) -> NoteServiceResult<Vec<String>> {
        Ok(self.repo.list_topics()?)
    }

    pub fn list_notes(&self) -> NoteServiceResult<Vec<NoteDocument>> {
        Ok(self.repo.list_notes()?)
    }

    /// Lists topics with a derived plain-text preview, sorted by topic.
    pub fn list_summaries(&self) -> NoteServiceResult<Vec<NoteSummary>> {
        Ok(self
            .repo
            .list_notes()?
            .into_iter()
            .map(|note| NoteSummary {
                preview_text: derive_preview_text(&note.body),
                topic: note.topic,
            })
            .collect())
    }
}

/// Derives a plain-text preview from a Markdown body.
///
/// Images are dropped, links keep their label, Markdown symbols are
/// stripped, whitespace is collapsed and the first 100 chars are kept.
pub fn derive_preview_text(body: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(body, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

fn append_paragraph(body: &mut String, text: &str) {
    if !body.is_empty() && !body.ends_with("\n\n") {
        body.push_str(if body.ends_with('\n') { "\n" } else { "\n\n" });
    }
    body.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::{append_paragraph, derive_preview_text};

    #[test]
    fn preview_strips_markdown_and_code_fences() {
        let body = "# Python core\n\n```python\ndef f(x=[]):\n```\n- [docs](https://docs.python.org)";
        let preview = derive_preview_text(body).expect("preview should exist");
        assert!(!preview.contains('#'));
        assert!(!preview.contains('`'));
        assert!(preview.starts_with("Python core"));
        assert!(preview.contains("docs"));
    }

    #[test]
    fn preview_is_none_for_symbol_only_body() {
        assert_eq!(derive_preview_text("---\n\n***"), None);
    }

    #[test]
    fn preview_caps_length() {
        let body = "word ".repeat(100);
        let preview = derive_preview_text(&body).unwrap();
        assert_eq!(preview.chars().count(), 100);
    }

    #[test]
    fn append_paragraph_inserts_single_blank_line() {
        let mut body = String::from("first");
        append_paragraph(&mut body, "second");
        assert_eq!(body, "first\n\nsecond");

        let mut body = String::from("first\n");
        append_paragraph(&mut body, "second");
        assert_eq!(body, "first\n\nsecond");

        let mut body = String::from("first\n\n");
        append_paragraph(&mut body, "second");
        assert_eq!(body, "first\n\nsecond");

        let mut body = String::new();
        append_paragraph(&mut body, "only");
        assert_eq!(body, "only");
    }
}
