//! Paths, goals and activities.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use super::database::{format_ts, parse_col, parse_ts, Database};
use crate::error::{CoreError, Result};
use crate::growth::{path_progress, Activity, Goal, GoalStatus, Path};

const PATH_COLUMNS: &str =
    "id, user_id, title, description, color, progress, created_at, updated_at";
const GOAL_COLUMNS: &str = "id, path_id, title, description, due_date, virtue, status, completed,
     xp_reward, created_at, updated_at";
const ACTIVITY_COLUMNS: &str = "id, goal_id, note, completed, xp_reward, created_at, updated_at";

fn row_to_path(row: &rusqlite::Row) -> rusqlite::Result<Path> {
    let progress: i64 = row.get(5)?;
    Ok(Path {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        color: row.get(4)?,
        progress: u8::try_from(progress)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(5, progress))?,
        created_at: parse_ts(6, &row.get::<_, String>(6)?)?,
        updated_at: parse_ts(7, &row.get::<_, String>(7)?)?,
    })
}

fn row_to_goal(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
    let due_date: Option<String> = row.get(4)?;
    let status: String = row.get(6)?;
    Ok(Goal {
        id: row.get(0)?,
        path_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        due_date: due_date
            .map(|d| parse_col(4, &d, |s| s.parse::<NaiveDate>()))
            .transpose()?,
        virtue: row.get(5)?,
        status: parse_col(6, &status, GoalStatus::parse)?,
        completed: row.get(7)?,
        xp_reward: row.get(8)?,
        created_at: parse_ts(9, &row.get::<_, String>(9)?)?,
        updated_at: parse_ts(10, &row.get::<_, String>(10)?)?,
    })
}

fn row_to_activity(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        note: row.get(2)?,
        completed: row.get(3)?,
        xp_reward: row.get(4)?,
        created_at: parse_ts(5, &row.get::<_, String>(5)?)?,
        updated_at: parse_ts(6, &row.get::<_, String>(6)?)?,
    })
}

impl Database {
    // === Paths ===

    pub fn create_path(&self, path: &Path) -> Result<()> {
        path.validate()?;
        self.require_profile(&path.user_id)?;
        self.conn().execute(
            "INSERT INTO paths (id, user_id, title, description, color, progress, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                path.id,
                path.user_id,
                path.title,
                path.description,
                path.color,
                i64::from(path.progress),
                format_ts(&path.created_at),
                format_ts(&path.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_path(&self, id: &str) -> Result<Option<Path>> {
        let sql = format!("SELECT {PATH_COLUMNS} FROM paths WHERE id = ?1");
        Ok(self.conn().query_row(&sql, params![id], row_to_path).optional()?)
    }

    pub fn require_path(&self, id: &str) -> Result<Path> {
        self.get_path(id)?
            .ok_or_else(|| CoreError::not_found("path", id))
    }

    /// A user's paths, newest first.
    pub fn list_paths(&self, user_id: &str) -> Result<Vec<Path>> {
        let sql = format!(
            "SELECT {PATH_COLUMNS} FROM paths WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let paths = stmt
            .query_map(params![user_id], row_to_path)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(paths)
    }

    /// Delete a path together with its goals and their activities.
    pub fn delete_path(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM paths WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("path", id));
        }
        Ok(())
    }

    /// Re-derive a path's progress from its goals and persist it.
    pub fn update_path_progress(&self, path_id: &str) -> Result<u8> {
        let (total, completed): (i64, i64) = self.conn().query_row(
            "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM goals WHERE path_id = ?1",
            params![path_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let progress = path_progress(
            usize::try_from(completed).unwrap_or(0),
            usize::try_from(total).unwrap_or(0),
        );

        let changed = self.conn().execute(
            "UPDATE paths SET progress = ?1, updated_at = ?2 WHERE id = ?3",
            params![i64::from(progress), format_ts(&Utc::now()), path_id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("path", path_id));
        }
        tracing::debug!(path_id, progress, "path progress updated");
        Ok(progress)
    }

    // === Goals ===

    pub fn create_goal(&self, goal: &Goal) -> Result<()> {
        goal.validate()?;
        self.require_path(&goal.path_id)?;
        self.conn().execute(
            "INSERT INTO goals (id, path_id, title, description, due_date, virtue, status, completed,
                                xp_reward, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                goal.id,
                goal.path_id,
                goal.title,
                goal.description,
                goal.due_date.map(|d| d.to_string()),
                goal.virtue,
                goal.status.as_str(),
                goal.completed,
                goal.xp_reward,
                format_ts(&goal.created_at),
                format_ts(&goal.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
        Ok(self.conn().query_row(&sql, params![id], row_to_goal).optional()?)
    }

    pub fn require_goal(&self, id: &str) -> Result<Goal> {
        self.get_goal(id)?
            .ok_or_else(|| CoreError::not_found("goal", id))
    }

    /// Goals of a path, oldest first.
    pub fn list_goals(&self, path_id: &str) -> Result<Vec<Goal>> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE path_id = ?1 ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let goals = stmt
            .query_map(params![path_id], row_to_goal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    /// Every goal on every path the user owns.
    pub fn list_user_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let sql = format!(
            "SELECT {} FROM goals g JOIN paths p ON p.id = g.path_id
             WHERE p.user_id = ?1 ORDER BY g.created_at, g.rowid",
            GOAL_COLUMNS
                .split(',')
                .map(|c| format!("g.{}", c.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let goals = stmt
            .query_map(params![user_id], row_to_goal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    /// Set a goal's status. The `completed` flag always follows the status.
    pub fn set_goal_status(&self, id: &str, status: GoalStatus) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE goals SET status = ?1, completed = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                status.as_str(),
                status == GoalStatus::Completed,
                format_ts(&Utc::now()),
                id
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("goal", id));
        }
        Ok(())
    }

    pub fn delete_goal(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM goals WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("goal", id));
        }
        Ok(())
    }

    // === Activities ===

    pub fn create_activity(&self, activity: &Activity) -> Result<()> {
        activity.validate()?;
        self.require_goal(&activity.goal_id)?;
        self.conn().execute(
            "INSERT INTO activities (id, goal_id, note, completed, xp_reward, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                activity.id,
                activity.goal_id,
                activity.note,
                activity.completed,
                activity.xp_reward,
                format_ts(&activity.created_at),
                format_ts(&activity.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id], row_to_activity)
            .optional()?)
    }

    pub fn require_activity(&self, id: &str) -> Result<Activity> {
        self.get_activity(id)?
            .ok_or_else(|| CoreError::not_found("activity", id))
    }

    pub fn list_activities(&self, goal_id: &str) -> Result<Vec<Activity>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE goal_id = ?1 ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let activities = stmt
            .query_map(params![goal_id], row_to_activity)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(activities)
    }

    pub fn set_activity_completed(&self, id: &str, completed: bool) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE activities SET completed = ?1, updated_at = ?2 WHERE id = ?3",
            params![completed, format_ts(&Utc::now()), id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("activity", id));
        }
        Ok(())
    }

    pub fn delete_activity(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("activity", id));
        }
        Ok(())
    }
}
