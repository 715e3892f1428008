//! Weekly log use-case service.
//!
//! # Responsibility
//! - Provide append/list/get APIs over any `LogRepository`.
//! - Surface duplicate weeks and lookup misses as first-class errors.
//! - Start the next week from the blank template.
//!
//! # Invariants
//! - `list` is restartable: two calls without a mutation in between return
//!   identical sequences.
//! - A rejected append never changes the stored log.

use crate::model::weekly_entry::{EntryValidationError, WeekLabel, WeeklyEntry};
use crate::repo::log_repo::LogRepository;
use crate::repo::RepoError;
use crate::template;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for weekly log use-cases.
#[derive(Debug)]
pub enum LogServiceError {
    /// The week label is already present in the log.
    DuplicateWeek(WeekLabel),
    /// No entry exists for the requested week.
    NotFound(WeekLabel),
    /// The latest week is already the highest representable week number.
    WeekOverflow(WeekLabel),
    /// Entry or label failed validation.
    Validation(EntryValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for LogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateWeek(label) => write!(f, "duplicate week: {label}"),
            Self::NotFound(label) => write!(f, "week not found: {label}"),
            Self::WeekOverflow(latest) => {
                write!(f, "no week can follow {latest}: week number limit reached")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::DuplicateWeek(_) | Self::NotFound(_) | Self::WeekOverflow(_) => None,
        }
    }
}

impl From<RepoError> for LogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateWeek(label) => Self::DuplicateWeek(label),
            RepoError::Entry(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<EntryValidationError> for LogServiceError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type LogServiceResult<T> = Result<T, LogServiceError>;

/// Weekly log facade over repository implementations.
pub struct LogService<R: LogRepository> {
    repo: R,
}

impl<R: LogRepository> LogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one entry to the log.
    ///
    /// # Errors
    /// - `DuplicateWeek` when the week number is already present.
    /// - `Validation` when the entry is unlabeled or has unrenderable items.
    pub fn append(&self, entry: &WeeklyEntry) -> LogServiceResult<WeekLabel> {
        match self.repo.append_entry(entry) {
            Ok(label) => {
                info!(
                    "event=log_append module=log_service status=ok week={}",
                    label.number()
                );
                Ok(label)
            }
            Err(err) => {
                let err = LogServiceError::from(err);
                if let LogServiceError::DuplicateWeek(label) = &err {
                    warn!(
                        "event=log_append module=log_service status=rejected error_code=duplicate_week week={}",
                        label.number()
                    );
                }
                Err(err)
            }
        }
    }

    /// Lists all entries in ascending week order.
    pub fn list(&self) -> LogServiceResult<Vec<WeeklyEntry>> {
        Ok(self.repo.list_entries()?)
    }

    /// Gets the entry for `week_label` (e.g. `"Week 3"`).
    pub fn get(&self, week_label: &str) -> LogServiceResult<WeeklyEntry> {
        let label = WeekLabel::parse(week_label)?;
        self.repo
            .get_entry(label)?
            .ok_or(LogServiceError::NotFound(label))
    }

    /// Returns the entry with the highest week number, if any.
    pub fn latest(&self) -> LogServiceResult<Option<WeeklyEntry>> {
        match self.repo.latest_label()? {
            Some(label) => Ok(self.repo.get_entry(label)?),
            None => Ok(None),
        }
    }

    /// Label that follows the latest entry; `Week 0` for an empty log.
    pub fn next_week_label(&self) -> LogServiceResult<WeekLabel> {
        match self.repo.latest_label()? {
            None => Ok(WeekLabel::BOOTSTRAP),
            Some(latest) => latest
                .next()
                .ok_or(LogServiceError::WeekOverflow(latest)),
        }
    }

    /// Renders the blank template labeled as the next week. Nothing is saved.
    pub fn start_next_week(&self, date_range: impl Into<String>) -> LogServiceResult<WeeklyEntry> {
        let mut entry = template::render();
        entry.week_label = Some(self.next_week_label()?);
        entry.date_range = date_range.into();
        Ok(entry)
    }
}
