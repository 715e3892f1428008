//! Markdown vault export and import.
//!
//! # Responsibility
//! - Write the whole log and every note into a vault directory.
//! - Load a vault directory back into a store.
//!
//! # Invariants
//! - Export never deletes files; notes have no deletion lifecycle.
//! - Re-importing an unchanged vault is a no-op: identical weeks are
//!   skipped and identical notes report `Unchanged`.
//! - A week that exists with different content, or appears twice in the
//!   log file, aborts the import with `DuplicateWeek`.
//! - Import checks the whole vault before writing; a rejected vault leaves
//!   the store unchanged.

use crate::config::{VaultLayout, NOTE_FILE_EXTENSION};
use crate::markdown::{self, MarkdownParseError};
use crate::model::note::{NoteDocument, UpsertOutcome};
use crate::model::weekly_entry::WeeklyEntry;
use crate::repo::log_repo::LogRepository;
use crate::repo::note_repo::NoteRepository;
use crate::service::log_service::{LogService, LogServiceError};
use crate::service::note_service::{NoteService, NoteServiceError};
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug)]
pub enum VaultError {
    Io { path: PathBuf, source: io::Error },
    Parse {
        path: PathBuf,
        source: MarkdownParseError,
    },
    /// Note file name is not valid UTF-8.
    InvalidFileName(PathBuf),
    Log(LogServiceError),
    Note(NoteServiceError),
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "vault io error at `{}`: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "failed to parse `{}`: {source}", path.display())
            }
            Self::InvalidFileName(path) => {
                write!(f, "note file name is not valid UTF-8: `{}`", path.display())
            }
            Self::Log(err) => write!(f, "{err}"),
            Self::Note(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidFileName(_) => None,
            Self::Log(err) => Some(err),
            Self::Note(err) => Some(err),
        }
    }
}

impl From<LogServiceError> for VaultError {
    fn from(value: LogServiceError) -> Self {
        Self::Log(value)
    }
}

impl From<NoteServiceError> for VaultError {
    fn from(value: NoteServiceError) -> Self {
        Self::Note(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub entries: usize,
    pub notes: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub entries_added: usize,
    /// Weeks already stored with identical content.
    pub entries_skipped: usize,
    pub notes_created: usize,
    pub notes_updated: usize,
    pub notes_unchanged: usize,
}

/// Vault directory bound to a layout.
#[derive(Debug, Clone)]
pub struct Vault {
    layout: VaultLayout,
}

impl Vault {
    pub fn new(layout: VaultLayout) -> Self {
        Self { layout }
    }

    /// Writes the log file and one file per note, creating directories.
    pub fn export<L, N>(
        &self,
        log: &LogService<L>,
        notes: &NoteService<N>,
    ) -> VaultResult<ExportReport>
    where
        L: LogRepository,
        N: NoteRepository,
    {
        let entries = log.list()?;
        let documents = notes.list_notes()?;

        create_dir(&self.layout.root)?;
        write_file(&self.layout.log_path(), &markdown::render_log(&entries))?;

        let notes_dir = self.layout.notes_dir();
        create_dir(&notes_dir)?;
        for note in &documents {
            write_file(&self.layout.note_path(&note.topic), &note.body)?;
        }

        let report = ExportReport {
            entries: entries.len(),
            notes: documents.len(),
        };
        info!(
            "event=vault_export module=vault status=ok entries={} notes={}",
            report.entries, report.notes
        );
        Ok(report)
    }

    /// Loads the vault into the given services.
    ///
    /// A missing log file or notes directory counts as empty. Every file is
    /// read, parsed and checked against the store before the first write, so
    /// a rejected vault leaves the store unchanged.
    pub fn import<L, N>(
        &self,
        log: &LogService<L>,
        notes: &NoteService<N>,
    ) -> VaultResult<ImportReport>
    where
        L: LogRepository,
        N: NoteRepository,
    {
        let mut report = ImportReport::default();
        let entries = self.plan_log(log, &mut report)?;
        let documents = self.plan_notes()?;

        for entry in &entries {
            log.append(entry)?;
            report.entries_added += 1;
        }
        for note in documents {
            match notes.upsert(&note.topic, note.body)? {
                UpsertOutcome::Created => report.notes_created += 1,
                UpsertOutcome::Updated => report.notes_updated += 1,
                UpsertOutcome::Unchanged => report.notes_unchanged += 1,
            }
        }

        info!(
            "event=vault_import module=vault status=ok entries_added={} entries_skipped={} notes_created={} notes_updated={} notes_unchanged={}",
            report.entries_added,
            report.entries_skipped,
            report.notes_created,
            report.notes_updated,
            report.notes_unchanged
        );
        Ok(report)
    }

    /// Returns the entries that still need appending.
    ///
    /// Weeks stored with identical content are counted as skipped; a week
    /// repeated in the file or stored with different content is rejected.
    fn plan_log<L: LogRepository>(
        &self,
        log: &LogService<L>,
        report: &mut ImportReport,
    ) -> VaultResult<Vec<WeeklyEntry>> {
        let path = self.layout.log_path();
        let Some(text) = read_optional(&path)? else {
            return Ok(Vec::new());
        };
        let entries = markdown::parse_log(&text).map_err(|source| VaultError::Parse {
            path: path.clone(),
            source,
        })?;

        let mut seen = BTreeSet::new();
        let mut pending = Vec::new();
        for entry in entries {
            let label = entry.validate().map_err(LogServiceError::from)?;
            if !seen.insert(label) {
                return Err(LogServiceError::DuplicateWeek(label).into());
            }
            match log.get(&label.to_string()) {
                Ok(stored) if stored == entry => report.entries_skipped += 1,
                Ok(_) => return Err(LogServiceError::DuplicateWeek(label).into()),
                Err(LogServiceError::NotFound(_)) => pending.push(entry),
                Err(err) => return Err(err.into()),
            }
        }
        Ok(pending)
    }

    /// Reads every note file with its topic already normalized.
    fn plan_notes(&self) -> VaultResult<Vec<NoteDocument>> {
        let dir = self.layout.notes_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(&dir).map_err(|source| io_error(&dir, source))?;
        let mut paths = Vec::new();
        for dir_entry in read_dir {
            let path = dir_entry.map_err(|source| io_error(&dir, source))?.path();
            let is_note = path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(NOTE_FILE_EXTENSION);
            if is_note {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| VaultError::InvalidFileName(path.clone()))?;
            let body = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
            let note = NoteDocument::new(stem, body).map_err(NoteServiceError::from)?;
            documents.push(note);
        }
        Ok(documents)
    }
}

fn io_error(path: &Path, source: io::Error) -> VaultError {
    VaultError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn create_dir(path: &Path) -> VaultResult<()> {
    fs::create_dir_all(path).map_err(|source| io_error(path, source))
}

fn write_file(path: &Path, contents: &str) -> VaultResult<()> {
    fs::write(path, contents).map_err(|source| io_error(path, source))
}

fn read_optional(path: &Path) -> VaultResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(io_error(path, source)),
    }
}
