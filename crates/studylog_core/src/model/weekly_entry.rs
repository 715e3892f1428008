//! Weekly progress entry model.
//!
//! # Responsibility
//! - Define the fixed-schema weekly record and its five bullet sections.
//! - Parse and normalize `Week <n>` labels.
//!
//! # Invariants
//! - Labels compare and order by week number only.
//! - `Week 0` is the bootstrap record and always sorts first.
//! - A persisted entry always carries a label; template output does not.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static WEEK_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*week\s+(\d+)\s*$").expect("valid week label regex"));

/// Week number used as the ordering and uniqueness key.
pub type WeekNumber = u32;

/// Normalized `Week <n>` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekLabel(WeekNumber);

impl WeekLabel {
    /// Label of the bootstrap record.
    pub const BOOTSTRAP: Self = Self(0);

    pub fn new(number: WeekNumber) -> Self {
        Self(number)
    }

    pub fn number(self) -> WeekNumber {
        self.0
    }

    /// Parses `Week <n>` case-insensitively, ignoring surrounding whitespace.
    ///
    /// Leading zeros are accepted and dropped (`week 03` -> `Week 3`).
    pub fn parse(value: &str) -> Result<Self, EntryValidationError> {
        let caps = WEEK_LABEL_RE
            .captures(value)
            .ok_or_else(|| EntryValidationError::InvalidWeekLabel(value.to_string()))?;
        let digits = caps.get(1).map_or("", |m| m.as_str());
        digits
            .parse::<WeekNumber>()
            .map(Self)
            .map_err(|_| EntryValidationError::InvalidWeekLabel(value.to_string()))
    }

    /// Returns the label of the following week, or `None` on overflow.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Display for WeekLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Week {}", self.0)
    }
}

impl FromStr for WeekLabel {
    type Err = EntryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WeekLabel {
    type Error = EntryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WeekLabel> for String {
    fn from(value: WeekLabel) -> Self {
        value.to_string()
    }
}

/// Bullet sections of a weekly entry, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySection {
    Focus,
    WorkDone,
    KeyLearnings,
    Gaps,
    NextPriority,
}

impl EntrySection {
    pub const ALL: [Self; 5] = [
        Self::Focus,
        Self::WorkDone,
        Self::KeyLearnings,
        Self::Gaps,
        Self::NextPriority,
    ];

    /// Heading text used in the Markdown log layout.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::WorkDone => "What I Worked On",
            Self::KeyLearnings => "Key Learnings",
            Self::Gaps => "Gaps/Follow-ups",
            Self::NextPriority => "Next Week Priority",
        }
    }

    /// Matches a Markdown heading back to its section, ignoring case.
    pub fn from_heading(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|section| section.heading().eq_ignore_ascii_case(trimmed))
    }

    /// Stable storage key.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::WorkDone => "work_done",
            Self::KeyLearnings => "key_learnings",
            Self::Gaps => "gaps",
            Self::NextPriority => "next_priority",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_key() == value)
    }
}

impl Display for EntrySection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.heading())
    }
}

/// One structured log record for a calendar week of study.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyEntry {
    /// `None` until the author labels a template copy.
    pub week_label: Option<WeekLabel>,
    /// Free-form single-line range, e.g. `2024-01-15 to 2024-01-21`.
    pub date_range: String,
    pub focus: Vec<String>,
    pub work_done: Vec<String>,
    pub key_learnings: Vec<String>,
    pub gaps: Vec<String>,
    pub next_priority: Vec<String>,
}

impl WeeklyEntry {
    /// Creates an empty entry already carrying `label`.
    pub fn labeled(label: WeekLabel, date_range: impl Into<String>) -> Self {
        Self {
            week_label: Some(label),
            date_range: date_range.into(),
            ..Self::default()
        }
    }

    pub fn section(&self, section: EntrySection) -> &[String] {
        match section {
            EntrySection::Focus => &self.focus,
            EntrySection::WorkDone => &self.work_done,
            EntrySection::KeyLearnings => &self.key_learnings,
            EntrySection::Gaps => &self.gaps,
            EntrySection::NextPriority => &self.next_priority,
        }
    }

    pub fn section_mut(&mut self, section: EntrySection) -> &mut Vec<String> {
        match section {
            EntrySection::Focus => &mut self.focus,
            EntrySection::WorkDone => &mut self.work_done,
            EntrySection::KeyLearnings => &mut self.key_learnings,
            EntrySection::Gaps => &mut self.gaps,
            EntrySection::NextPriority => &mut self.next_priority,
        }
    }

    /// Returns whether every section is empty.
    pub fn all_sections_empty(&self) -> bool {
        EntrySection::ALL
            .into_iter()
            .all(|section| self.section(section).is_empty())
    }

    /// Validates this entry for persistence and returns its label.
    ///
    /// # Errors
    /// - `MissingWeekLabel` when the entry is still unlabeled.
    /// - `MultiLineDateRange` when the date range spans lines.
    /// - `BlankItem` / `MultiLineItem` for items that cannot render as a
    ///   single bullet.
    pub fn validate(&self) -> Result<WeekLabel, EntryValidationError> {
        let label = self
            .week_label
            .ok_or(EntryValidationError::MissingWeekLabel)?;

        if self.date_range.contains(['\n', '\r']) {
            return Err(EntryValidationError::MultiLineDateRange);
        }

        for section in EntrySection::ALL {
            for item in self.section(section) {
                if item.trim().is_empty() {
                    return Err(EntryValidationError::BlankItem { section });
                }
                if item.contains(['\n', '\r']) {
                    return Err(EntryValidationError::MultiLineItem { section });
                }
            }
        }

        Ok(label)
    }
}

/// Validation failures for weekly entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    MissingWeekLabel,
    InvalidWeekLabel(String),
    MultiLineDateRange,
    BlankItem { section: EntrySection },
    MultiLineItem { section: EntrySection },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingWeekLabel => write!(f, "weekly entry has no week label"),
            Self::InvalidWeekLabel(value) => {
                write!(f, "invalid week label `{value}`; expected `Week <n>`")
            }
            Self::MultiLineDateRange => write!(f, "date range must be a single line"),
            Self::BlankItem { section } => write!(f, "blank item in section `{section}`"),
            Self::MultiLineItem { section } => {
                write!(f, "item in section `{section}` spans multiple lines")
            }
        }
    }
}

impl Error for EntryValidationError {}

#[cfg(test)]
mod tests {
    use super::{EntrySection, EntryValidationError, WeekLabel, WeeklyEntry};

    #[test]
    fn week_label_parse_normalizes_case_whitespace_and_zeros() {
        let label = WeekLabel::parse("  week 03 ").expect("label should parse");
        assert_eq!(label.number(), 3);
        assert_eq!(label.to_string(), "Week 3");
    }

    #[test]
    fn week_label_parse_rejects_garbage_and_overflow() {
        assert!(matches!(
            WeekLabel::parse("Sprint 3"),
            Err(EntryValidationError::InvalidWeekLabel(_))
        ));
        assert!(WeekLabel::parse("Week -1").is_err());
        assert!(WeekLabel::parse("Week 99999999999").is_err());
    }

    #[test]
    fn week_label_next_stops_at_overflow() {
        assert_eq!(WeekLabel::new(4).next(), Some(WeekLabel::new(5)));
        assert_eq!(WeekLabel::new(u32::MAX).next(), None);
    }

    #[test]
    fn section_headings_round_trip() {
        for section in EntrySection::ALL {
            assert_eq!(EntrySection::from_heading(section.heading()), Some(section));
            assert_eq!(EntrySection::from_key(section.as_key()), Some(section));
        }
        assert_eq!(
            EntrySection::from_heading(" key learnings "),
            Some(EntrySection::KeyLearnings)
        );
    }

    #[test]
    fn validate_requires_label() {
        let entry = WeeklyEntry::default();
        assert_eq!(
            entry.validate(),
            Err(EntryValidationError::MissingWeekLabel)
        );
    }

    #[test]
    fn validate_rejects_blank_and_multi_line_items() {
        let mut entry = WeeklyEntry::labeled(WeekLabel::new(1), "Jan");
        entry.gaps.push("   ".to_string());
        assert_eq!(
            entry.validate(),
            Err(EntryValidationError::BlankItem {
                section: EntrySection::Gaps
            })
        );

        entry.gaps = vec!["line one\nline two".to_string()];
        assert_eq!(
            entry.validate(),
            Err(EntryValidationError::MultiLineItem {
                section: EntrySection::Gaps
            })
        );
    }

    #[test]
    fn label_serializes_as_text() {
        let json = serde_json::to_string(&WeekLabel::new(7)).expect("label should serialize");
        assert_eq!(json, "\"Week 7\"");
        let parsed: WeekLabel = serde_json::from_str("\"week 7\"").expect("label should parse");
        assert_eq!(parsed, WeekLabel::new(7));
    }
}
