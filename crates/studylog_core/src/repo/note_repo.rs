//! Note index repository contract and SQLite implementation.
//!
//! # Invariants
//! - One row per topic; `topic` is the primary key.
//! - Upserting an identical body performs no write and keeps `updated_at`.

use crate::model::note::{normalize_topic, NoteDocument, UpsertOutcome};
use crate::repo::{ensure_tables, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for the topic note index.
pub trait NoteRepository {
    fn get_note(&self, topic: &str) -> RepoResult<Option<NoteDocument>>;
    /// Creates or replaces the document stored for `note.topic`.
    fn upsert_note(&self, note: &NoteDocument) -> RepoResult<UpsertOutcome>;
    /// Returns all topics sorted ascending.
    fn list_topics(&self) -> RepoResult<Vec<String>>;
    /// Returns all documents sorted by topic ascending.
    fn list_notes(&self) -> RepoResult<Vec<NoteDocument>>;
}

/// SQLite-backed note index.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["notes"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn get_note(&self, topic: &str) -> RepoResult<Option<NoteDocument>> {
        let topic = normalize_topic(topic)?;
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM notes WHERE topic = ?1;",
                [topic.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(body.map(|body| NoteDocument { topic, body }))
    }

    fn upsert_note(&self, note: &NoteDocument) -> RepoResult<UpsertOutcome> {
        let topic = normalize_topic(&note.topic)?;

        let tx = self.conn.unchecked_transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT body FROM notes WHERE topic = ?1;",
                [topic.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(body) if body == note.body => return Ok(UpsertOutcome::Unchanged),
            Some(_) => {
                tx.execute(
                    "UPDATE notes
                     SET
                        body = ?2,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE topic = ?1;",
                    params![topic.as_str(), note.body.as_str()],
                )?;
                UpsertOutcome::Updated
            }
            None => {
                tx.execute(
                    "INSERT INTO notes (topic, body) VALUES (?1, ?2);",
                    params![topic.as_str(), note.body.as_str()],
                )?;
                UpsertOutcome::Created
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn list_topics(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT topic FROM notes ORDER BY topic ASC;")?;
        let topics = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    fn list_notes(&self) -> RepoResult<Vec<NoteDocument>> {
        let mut stmt = self
            .conn
            .prepare("SELECT topic, body FROM notes ORDER BY topic ASC;")?;
        let notes = stmt
            .query_map([], |row| {
                Ok(NoteDocument {
                    topic: row.get("topic")?,
                    body: row.get("body")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }
}
