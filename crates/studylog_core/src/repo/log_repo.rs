//! Weekly log repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist weekly entries keyed by week number.
//! - Return entries in ascending week order.
//!
//! # Invariants
//! - Appends run in one transaction: the duplicate check, the entry row and
//!   all item rows commit together or not at all.
//! - Item order inside a section is preserved via `position`.

use crate::model::weekly_entry::{EntrySection, WeekLabel, WeekNumber, WeeklyEntry};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for the weekly log.
pub trait LogRepository {
    /// Appends one validated entry and returns its label.
    ///
    /// Fails with `RepoError::DuplicateWeek` when the week already exists.
    fn append_entry(&self, entry: &WeeklyEntry) -> RepoResult<WeekLabel>;
    fn get_entry(&self, label: WeekLabel) -> RepoResult<Option<WeeklyEntry>>;
    /// Lists all entries ordered by week number ascending.
    fn list_entries(&self) -> RepoResult<Vec<WeeklyEntry>>;
    fn latest_label(&self) -> RepoResult<Option<WeekLabel>>;
}

/// SQLite-backed weekly log repository.
pub struct SqliteLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLogRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["weekly_entries", "weekly_entry_items"])?;
        Ok(Self { conn })
    }

    fn load_entry(&self, week_number: i64, date_range: String) -> RepoResult<WeeklyEntry> {
        let number = WeekNumber::try_from(week_number).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid week number `{week_number}` in weekly_entries.week_number"
            ))
        })?;
        let mut entry = WeeklyEntry::labeled(WeekLabel::new(number), date_range);

        let mut stmt = self.conn.prepare_cached(
            "SELECT section, text
             FROM weekly_entry_items
             WHERE week_number = ?1
             ORDER BY section ASC, position ASC;",
        )?;
        let mut rows = stmt.query([week_number])?;
        while let Some(row) = rows.next()? {
            let key: String = row.get("section")?;
            let section = EntrySection::from_key(&key).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid section `{key}` in weekly_entry_items.section"
                ))
            })?;
            entry.section_mut(section).push(row.get("text")?);
        }

        Ok(entry)
    }
}

impl LogRepository for SqliteLogRepository<'_> {
    fn append_entry(&self, entry: &WeeklyEntry) -> RepoResult<WeekLabel> {
        let label = entry.validate()?;
        let week_number = i64::from(label.number());

        let tx = self.conn.unchecked_transaction()?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM weekly_entries WHERE week_number = ?1);",
            [week_number],
            |row| row.get(0),
        )?;
        if exists == 1 {
            return Err(RepoError::DuplicateWeek(label));
        }

        tx.execute(
            "INSERT INTO weekly_entries (week_number, date_range) VALUES (?1, ?2);",
            params![week_number, entry.date_range.as_str()],
        )?;

        for section in EntrySection::ALL {
            for (position, text) in entry.section(section).iter().enumerate() {
                tx.execute(
                    "INSERT INTO weekly_entry_items (week_number, section, position, text)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![week_number, section.as_key(), position as i64, text.as_str()],
                )?;
            }
        }

        tx.commit()?;
        Ok(label)
    }

    fn get_entry(&self, label: WeekLabel) -> RepoResult<Option<WeeklyEntry>> {
        let week_number = i64::from(label.number());
        let date_range: Option<String> = self
            .conn
            .query_row(
                "SELECT date_range FROM weekly_entries WHERE week_number = ?1;",
                [week_number],
                |row| row.get(0),
            )
            .optional()?;

        date_range
            .map(|date_range| self.load_entry(week_number, date_range))
            .transpose()
    }

    fn list_entries(&self) -> RepoResult<Vec<WeeklyEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT week_number, date_range
             FROM weekly_entries
             ORDER BY week_number ASC;",
        )?;
        let headers = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>("week_number")?, row.get::<_, String>("date_range")?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|(week_number, date_range)| self.load_entry(week_number, date_range))
            .collect()
    }

    fn latest_label(&self) -> RepoResult<Option<WeekLabel>> {
        let latest: Option<i64> = self.conn.query_row(
            "SELECT MAX(week_number) FROM weekly_entries;",
            [],
            |row| row.get(0),
        )?;

        latest
            .map(|value| {
                WeekNumber::try_from(value).map(WeekLabel::new).map_err(|_| {
                    RepoError::InvalidData(format!(
                        "invalid week number `{value}` in weekly_entries.week_number"
                    ))
                })
            })
            .transpose()
    }
}
