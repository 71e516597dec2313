//! Stored notifications.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::database::{parse_ts, Database};
use super::ledger::insert_notification;
use crate::error::{CoreError, Result};
use crate::notification::{Notification, NotificationDraft, NotificationKind};

fn row_to_notification(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
    let data: String = row.get(5)?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: NotificationKind::from(row.get::<_, String>(2)?),
        title: row.get(3)?,
        message: row.get(4)?,
        data: serde_json::from_str(&data).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        read: row.get(6)?,
        created_at: parse_ts(7, &row.get::<_, String>(7)?)?,
    })
}

impl Database {
    /// Store a notification for a user and return its id.
    pub fn create_notification(&self, user_id: &str, draft: &NotificationDraft) -> Result<String> {
        self.require_profile(user_id)?;
        insert_notification(self.conn(), user_id, draft, &Utc::now())
    }

    pub fn get_notification(&self, id: &str) -> Result<Option<Notification>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, user_id, kind, title, message, data, read, created_at
                 FROM notifications WHERE id = ?1",
                params![id],
                row_to_notification,
            )
            .optional()?)
    }

    /// Newest first.
    pub fn list_notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, kind, title, message, data, read, created_at
             FROM notifications WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![user_id, limit], row_to_notification)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn mark_notification_read(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("UPDATE notifications SET read = 1 WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("notification", id));
        }
        Ok(())
    }

    /// Returns how many were newly marked.
    pub fn mark_all_notifications_read(&self, user_id: &str) -> Result<usize> {
        Ok(self.conn().execute(
            "UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0",
            params![user_id],
        )?)
    }

    pub fn delete_notification(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM notifications WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("notification", id));
        }
        Ok(())
    }

    pub fn unread_notification_count(&self, user_id: &str) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND read = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count.unsigned_abs())
    }
}
