//! Daily quests.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::database::{format_ts, parse_col, parse_opt_ts, parse_ts, Database};
use crate::error::{CoreError, Result};
use crate::quest::{default_quests, DailyQuest, QuestType};
use crate::streak::{parse_timestamps, ParsedTimestamps};

const QUEST_COLUMNS: &str = "id, user_id, title, description, quest_type, xp_reward, completed,
     completed_at, created_at";

fn row_to_quest(row: &rusqlite::Row) -> rusqlite::Result<DailyQuest> {
    let quest_type: String = row.get(4)?;
    Ok(DailyQuest {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        quest_type: parse_col(4, &quest_type, QuestType::parse)?,
        xp_reward: row.get(5)?,
        completed: row.get(6)?,
        completed_at: parse_opt_ts(7, row.get(7)?)?,
        created_at: parse_ts(8, &row.get::<_, String>(8)?)?,
    })
}

impl Database {
    pub fn create_quest(&self, quest: &DailyQuest) -> Result<()> {
        quest.validate()?;
        self.require_profile(&quest.user_id)?;
        self.conn().execute(
            "INSERT INTO daily_quests (id, user_id, title, description, quest_type, xp_reward,
                                       completed, completed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                quest.id,
                quest.user_id,
                quest.title,
                quest.description,
                quest.quest_type.as_str(),
                quest.xp_reward,
                quest.completed,
                quest.completed_at.as_ref().map(format_ts),
                format_ts(&quest.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_quest(&self, id: &str) -> Result<Option<DailyQuest>> {
        let sql = format!("SELECT {QUEST_COLUMNS} FROM daily_quests WHERE id = ?1");
        Ok(self.conn().query_row(&sql, params![id], row_to_quest).optional()?)
    }

    pub fn require_quest(&self, id: &str) -> Result<DailyQuest> {
        self.get_quest(id)?
            .ok_or_else(|| CoreError::not_found("quest", id))
    }

    /// A user's quests in the order they were created.
    pub fn list_quests(&self, user_id: &str) -> Result<Vec<DailyQuest>> {
        let sql = format!(
            "SELECT {QUEST_COLUMNS} FROM daily_quests WHERE user_id = ?1 ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let quests = stmt
            .query_map(params![user_id], row_to_quest)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(quests)
    }

    /// Insert the starter quests if the user has none. Returns what was
    /// inserted, which is empty when quests already existed.
    pub fn seed_default_quests(&self, user_id: &str) -> Result<Vec<DailyQuest>> {
        self.require_profile(user_id)?;
        let existing: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM daily_quests WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(Vec::new());
        }

        let quests = default_quests(user_id);
        self.in_transaction(|_| {
            for quest in &quests {
                self.create_quest(quest)?;
            }
            Ok(())
        })?;
        tracing::info!(user_id, count = quests.len(), "default quests seeded");
        Ok(quests)
    }

    /// Mark a quest done at `at`, or open again when `at` is `None`.
    pub fn set_quest_completed(&self, id: &str, at: Option<DateTime<Utc>>) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE daily_quests SET completed = ?1, completed_at = ?2 WHERE id = ?3",
            params![at.is_some(), at.as_ref().map(format_ts), id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("quest", id));
        }
        Ok(())
    }

    pub fn delete_quest(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM daily_quests WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("quest", id));
        }
        Ok(())
    }

    /// Completion times of finished quests, for streaks.
    pub fn quest_completion_timestamps(&self, user_id: &str) -> Result<ParsedTimestamps> {
        let mut stmt = self.conn().prepare(
            "SELECT completed_at FROM daily_quests
             WHERE user_id = ?1 AND completed = 1 AND completed_at IS NOT NULL",
        )?;
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
    fn seeding_only_happens_once() {
        let db = db();
        assert_eq!(db.seed_default_quests("u1").unwrap().len(), 4);
        assert!(db.seed_default_quests("u1").unwrap().is_empty());
        assert_eq!(db.list_quests("u1").unwrap().len(), 4);
    }

    #[test]
    fn seeding_unknown_user_fails() {
        let db = Database::open_memory().unwrap();
        assert!(db.seed_default_quests("ghost").is_err());
    }

    #[test]
    fn completion_sets_and_clears_timestamp() {
        let db = db();
        let quest = DailyQuest::new("u1", "Walk");
        db.create_quest(&quest).unwrap();

        let at: DateTime<Utc> = "2026-10-18T07:30:00Z".parse().unwrap();
        db.set_quest_completed(&quest.id, Some(at)).unwrap();
        let done = db.require_quest(&quest.id).unwrap();
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(at));
        assert_eq!(db.quest_completion_timestamps("u1").unwrap().timestamps, vec![at]);

        db.set_quest_completed(&quest.id, None).unwrap();
        let reopened = db.require_quest(&quest.id).unwrap();
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());
        assert!(db.quest_completion_timestamps("u1").unwrap().timestamps.is_empty());
    }

    #[test]
    fn missing_quest_is_not_found() {
        let db = db();
        assert!(matches!(
            db.set_quest_completed("nope", None),
            Err(CoreError::NotFound { .. })
        ));
        assert!(db.delete_quest("nope").is_err());
    }
}
