//! On-disk vault layout.
//!
//! A vault is the Markdown rendition of a whole store:
//! `<root>/progress-log.md` plus `<root>/notes/<topic>.md`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE_NAME: &str = "progress-log.md";
pub const DEFAULT_NOTES_DIR_NAME: &str = "notes";
pub const NOTE_FILE_EXTENSION: &str = "md";

/// File names used inside a vault directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultLayout {
    pub root: PathBuf,
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
    #[serde(default = "default_notes_dir_name")]
    pub notes_dir_name: String,
}

impl VaultLayout {
    /// Layout with default file names under `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            log_file_name: default_log_file_name(),
            notes_dir_name: default_notes_dir_name(),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(&self.log_file_name)
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root.join(&self.notes_dir_name)
    }

    /// Path of the file holding `topic`. The topic must already be normalized.
    pub fn note_path(&self, topic: &str) -> PathBuf {
        self.notes_dir()
            .join(format!("{topic}.{NOTE_FILE_EXTENSION}"))
    }
}

fn default_log_file_name() -> String {
    DEFAULT_LOG_FILE_NAME.to_string()
}

fn default_notes_dir_name() -> String {
    DEFAULT_NOTES_DIR_NAME.to_string()
}
