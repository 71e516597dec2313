//! Journal entries.

use rusqlite::{params, OptionalExtension};

use super::database::{format_ts, parse_ts, Database};
use crate::error::{CoreError, Result};
use crate::journal::JournalEntry;
use crate::streak::{parse_timestamps, ParsedTimestamps};

const JOURNAL_COLUMNS: &str = "id, user_id, title, content, mood, tags, created_at, updated_at";

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<JournalEntry> {
    let mood: Option<i64> = row.get(4)?;
    let tags: String = row.get(5)?;
    Ok(JournalEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        mood: mood
            .map(|m| u8::try_from(m).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(4, m)))
            .transpose()?,
        tags: serde_json::from_str(&tags).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: parse_ts(6, &row.get::<_, String>(6)?)?,
        updated_at: parse_ts(7, &row.get::<_, String>(7)?)?,
    })
}

impl Database {
    pub fn create_journal_entry(&self, entry: &JournalEntry) -> Result<()> {
        entry.validate()?;
        self.require_profile(&entry.user_id)?;
        self.conn().execute(
            "INSERT INTO journal_entries (id, user_id, title, content, mood, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id,
                entry.user_id,
                entry.title,
                entry.content,
                entry.mood.map(i64::from),
                serde_json::to_string(&entry.tags)?,
                format_ts(&entry.created_at),
                format_ts(&entry.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_journal_entry(&self, id: &str) -> Result<Option<JournalEntry>> {
        let sql = format!("SELECT {JOURNAL_COLUMNS} FROM journal_entries WHERE id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id], row_to_entry)
            .optional()?)
    }

    pub fn require_journal_entry(&self, id: &str) -> Result<JournalEntry> {
        self.get_journal_entry(id)?
            .ok_or_else(|| CoreError::not_found("journal entry", id))
    }

    /// A user's entries, newest first.
    pub fn list_journal_entries(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<JournalEntry>> {
        let mut sql = format!(
            "SELECT {JOURNAL_COLUMNS} FROM journal_entries WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        let mut stmt = self.conn().prepare(&sql)?;
        let mut entries = Vec::new();
        for row in stmt.query_map(params![user_id], row_to_entry)? {
            match row {
                Ok(entry) => entries.push(entry),
                Err(rusqlite::Error::FromSqlConversionFailure(idx @ (6 | 7), _, e)) => {
                    tracing::warn!(
                        user_id,
                        column = idx,
                        error = %e,
                        "skipping journal entry with malformed timestamp"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(entries)
    }

    pub fn delete_journal_entry(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM journal_entries WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("journal entry", id));
        }
        Ok(())
    }

    /// Creation times of every entry, for streaks. Unparseable values are
    /// skipped rather than failing the whole read.
    pub fn journal_timestamps(&self, user_id: &str) -> Result<ParsedTimestamps> {
        let mut stmt = self
            .conn()
            .prepare("SELECT created_at FROM journal_entries WHERE user_id = ?1")?;
        let raw = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(parse_timestamps(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;

    fn db() -> Database {
        let db = Database::open_memory().unwrap();
        db.create_profile(&Profile::new("u1", "a@b.c", "A")).unwrap();
        db
    }

    #[test]
    fn entry_round_trip_keeps_tags_and_mood() {
        let db = db();
        let mut entry = JournalEntry::new("u1", "Trained at dawn");
        entry.title = Some("Morning".to_string());
        entry.mood = Some(4);
        entry.tags = vec!["training".to_string(), "dawn".to_string()];
        db.create_journal_entry(&entry).unwrap();

        assert_eq!(db.require_journal_entry(&entry.id).unwrap(), entry);
    }

    #[test]
    fn invalid_mood_is_rejected() {
        let db = db();
        let mut entry = JournalEntry::new("u1", "x");
        entry.mood = Some(9);
        assert!(db.create_journal_entry(&entry).is_err());
        assert!(db.list_journal_entries("u1", None).unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first_and_limited() {
        let db = db();
        for (i, day) in [1, 3, 2].into_iter().enumerate() {
            let mut entry = JournalEntry::new("u1", format!("entry {i}"));
            entry.created_at = format!("2026-10-0{day}T08:00:00Z").parse().unwrap();
            db.create_journal_entry(&entry).unwrap();
        }
        let entries = db.list_journal_entries("u1", Some(2)).unwrap();
        let days: Vec<String> = entries
            .iter()
            .map(|e| e.created_at.format("%d").to_string())
            .collect();
        assert_eq!(days, vec!["03", "02"]);
    }

    #[test]
    fn malformed_timestamps_are_skipped() {
        let db = db();
        db.create_journal_entry(&JournalEntry::new("u1", "fine")).unwrap();
        db.conn()
            .execute(
                "INSERT INTO journal_entries (id, user_id, content, created_at, updated_at)
                 VALUES ('bad', 'u1', 'broken', 'yesterday-ish', 'yesterday-ish')",
                [],
            )
            .unwrap();

        let parsed = db.journal_timestamps("u1").unwrap();
        assert_eq!(parsed.timestamps.len(), 1);
        assert_eq!(parsed.skipped, 1);

        let listed = db.list_journal_entries("u1", None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "fine");
    }

    #[test]
    fn delete_missing_entry_is_not_found() {
        let db = db();
        assert!(matches!(
            db.delete_journal_entry("nope"),
            Err(CoreError::NotFound { .. })
        ));
    }
}
