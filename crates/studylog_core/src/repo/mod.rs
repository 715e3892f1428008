//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define storage contracts for the weekly log and the note index.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate records before any SQL mutation.
//! - A failed write leaves persisted state unchanged.

use crate::db::DbError;
use crate::model::note::NoteValidationError;
use crate::model::weekly_entry::{EntryValidationError, WeekLabel};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod log_repo;
pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by log and note persistence.
#[derive(Debug)]
pub enum RepoError {
    Entry(EntryValidationError),
    Note(NoteValidationError),
    Db(DbError),
    /// A weekly entry with the same week number already exists.
    DuplicateWeek(WeekLabel),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry(err) => write!(f, "{err}"),
            Self::Note(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateWeek(label) => write!(f, "weekly entry already exists: {label}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Entry(err) => Some(err),
            Self::Note(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateWeek(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Entry(value)
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Note(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
