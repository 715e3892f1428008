//! Core logic for the weekly study log and topic note index.
//! This crate owns every storage and formatting invariant.

pub mod config;
pub mod db;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod repo;
pub mod service;
pub mod template;
pub mod vault;

pub use config::VaultLayout;
pub use logging::{default_log_level, init_logging, logging_status};
pub use markdown::{parse_entry, parse_log, render_entry, render_log, MarkdownParseError};
pub use model::note::{NoteDocument, NoteValidationError, UpsertOutcome};
pub use model::weekly_entry::{
    EntrySection, EntryValidationError, WeekLabel, WeekNumber, WeeklyEntry,
};
pub use repo::log_repo::{LogRepository, SqliteLogRepository};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::log_service::{LogService, LogServiceError, LogServiceResult};
pub use service::note_service::{
    derive_preview_text, NoteService, NoteServiceError, NoteServiceResult, NoteSummary,
};
pub use vault::{ExportReport, ImportReport, Vault, VaultError, VaultResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
