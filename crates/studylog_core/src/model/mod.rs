//! Domain model for the weekly progress log and the topic note index.
//!
//! # Responsibility
//! - Define the records persisted by the log store and the note index.
//! - Own field-level validation so every storage path shares one contract.
//!
//! # Invariants
//! - A weekly entry is identified by its week number, never by label text.
//! - Log entries and notes are independent collections with no links.

pub mod note;
pub mod weekly_entry;
