//! Heading-based Markdown layout for the weekly log.
//!
//! # Responsibility
//! - Render weekly entries as `## Week <n>` blocks with one `###` heading
//!   per section and one bullet per item.
//! - Parse that layout back into entries.
//!
//! # Invariants
//! - An empty section renders as a lone `-` placeholder and parses back to
//!   an empty section.
//! - Rendering then parsing a validated entry reproduces it exactly.

use crate::model::weekly_entry::{EntrySection, WeekLabel, WeeklyEntry};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title line written at the top of a rendered log.
pub const LOG_TITLE: &str = "Weekly Progress Log";
/// Heading text used for entries that have no label yet.
pub const UNSET_WEEK_LABEL: &str = "Week ?";

const EMPTY_ITEM_PLACEHOLDER: &str = "-";

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.*?)\s*$").expect("valid heading regex"));
static DATES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_Dates: ?(.*)_$").expect("valid dates regex"));

/// Parse failure with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownParseError {
    pub line: usize,
    pub message: String,
}

impl MarkdownParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl Display for MarkdownParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl Error for MarkdownParseError {}

/// Renders one entry block.
pub fn render_entry(entry: &WeeklyEntry) -> String {
    let label = entry
        .week_label
        .map_or_else(|| UNSET_WEEK_LABEL.to_string(), |label| label.to_string());

    let mut out = format!("## {label}\n_Dates: {}_\n", entry.date_range);
    for section in EntrySection::ALL {
        out.push_str(&format!("\n### {}\n", section.heading()));
        let items = entry.section(section);
        if items.is_empty() {
            out.push_str(EMPTY_ITEM_PLACEHOLDER);
            out.push('\n');
        }
        for item in items {
            out.push_str(&format!("- {item}\n"));
        }
    }
    out
}

/// Renders a full log file: title followed by every entry in order.
pub fn render_log(entries: &[WeeklyEntry]) -> String {
    let mut out = format!("# {LOG_TITLE}\n");
    for entry in entries {
        out.push('\n');
        out.push_str(&render_entry(entry));
    }
    out
}

/// Parses a full log file.
///
/// The `#` title is optional. Entries come back in file order; `Week ?`
/// headings yield entries with no label. Within one entry the date line
/// and each section heading may appear at most once.
pub fn parse_log(text: &str) -> Result<Vec<WeeklyEntry>, MarkdownParseError> {
    let mut entries: Vec<WeeklyEntry> = Vec::new();
    let mut section: Option<EntrySection> = None;
    let mut opened: BTreeSet<EntrySection> = BTreeSet::new();
    let mut dates_seen = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = caps.get(1).map_or(0, |m| m.as_str().len());
            let title = caps.get(2).map_or("", |m| m.as_str());
            match level {
                1 if entries.is_empty() => {}
                1 => {
                    return Err(MarkdownParseError::new(
                        line_no,
                        "log title must precede every entry",
                    ))
                }
                2 => {
                    entries.push(WeeklyEntry {
                        week_label: parse_heading_label(title, line_no)?,
                        ..WeeklyEntry::default()
                    });
                    section = None;
                    opened.clear();
                    dates_seen = false;
                }
                _ => {
                    if entries.is_empty() {
                        return Err(MarkdownParseError::new(
                            line_no,
                            "section heading outside of a week entry",
                        ));
                    }
                    let next = EntrySection::from_heading(title).ok_or_else(|| {
                        MarkdownParseError::new(line_no, format!("unknown section `{title}`"))
                    })?;
                    if !opened.insert(next) {
                        return Err(MarkdownParseError::new(
                            line_no,
                            format!("duplicate section `{title}`"),
                        ));
                    }
                    section = Some(next);
                }
            }
            continue;
        }

        let Some(entry) = entries.last_mut() else {
            return Err(MarkdownParseError::new(
                line_no,
                "unexpected text before the first week entry",
            ));
        };

        if let Some(caps) = DATES_RE.captures(line) {
            if section.is_some() {
                return Err(MarkdownParseError::new(
                    line_no,
                    "date line must precede section headings",
                ));
            }
            if dates_seen {
                return Err(MarkdownParseError::new(line_no, "duplicate date line"));
            }
            dates_seen = true;
            entry.date_range = caps.get(1).map_or("", |m| m.as_str()).to_string();
            continue;
        }

        if line.trim() == EMPTY_ITEM_PLACEHOLDER {
            if section.is_none() {
                return Err(MarkdownParseError::new(line_no, "bullet outside of a section"));
            }
            continue;
        }

        match (section, line.strip_prefix("- ")) {
            (Some(current), Some(item)) => entry.section_mut(current).push(item.to_string()),
            (None, Some(_)) => {
                return Err(MarkdownParseError::new(line_no, "bullet outside of a section"))
            }
            (_, None) => {
                return Err(MarkdownParseError::new(
                    line_no,
                    format!("unexpected line `{}`", line.trim()),
                ))
            }
        }
    }

    Ok(entries)
}

/// Parses text holding exactly one entry block.
pub fn parse_entry(text: &str) -> Result<WeeklyEntry, MarkdownParseError> {
    let mut entries = parse_log(text)?;
    match entries.len() {
        1 => Ok(entries.remove(0)),
        count => Err(MarkdownParseError::new(
            1,
            format!("expected exactly one week entry, found {count}"),
        )),
    }
}

fn parse_heading_label(
    title: &str,
    line_no: usize,
) -> Result<Option<WeekLabel>, MarkdownParseError> {
    if title == UNSET_WEEK_LABEL {
        return Ok(None);
    }
    WeekLabel::parse(title)
        .map(Some)
        .map_err(|err| MarkdownParseError::new(line_no, err.to_string()))
}
