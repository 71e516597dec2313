//! The XP ledger and the progress snapshot it feeds.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::database::{format_ts, parse_col, parse_ts, to_u32, to_u64, Database};
use crate::error::{CoreError, Result, ValidationError};
use crate::leveling::{
    award_notifications, level_for_xp, AwardOutcome, XpAward, XpSource, XpStore, XpTransaction,
};
use crate::notification::NotificationDraft;
use crate::profile::UserProgress;

/// Filters for [`Database::xp_history`].
#[derive(Debug, Clone, Default)]
pub struct XpHistoryFilter {
    pub source: Option<XpSource>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<XpTransaction> {
    let source: String = row.get(3)?;
    Ok(XpTransaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        source: parse_col(3, &source, |s| s.parse::<XpSource>())?,
        source_id: row.get(4)?,
        description: row.get(5)?,
        created_at: parse_ts(6, &row.get::<_, String>(6)?)?,
    })
}

fn read_snapshot(tx: &Connection, user_id: &str) -> Result<(u64, u32)> {
    let snapshot = tx
        .query_row(
            "SELECT xp, level FROM profiles WHERE id = ?1",
            params![user_id],
            |row| Ok((to_u64(0, row.get(0)?)?, to_u32(1, row.get(1)?)?)),
        )
        .optional()?;
    snapshot.ok_or_else(|| CoreError::not_found("profile", user_id))
}

fn write_snapshot(tx: &Connection, user_id: &str, xp: u64, at: &DateTime<Utc>) -> Result<()> {
    let stored = i64::try_from(xp)
        .map_err(|_| ValidationError::invalid("xp", "exceeds the storable range"))?;
    tx.execute(
        "UPDATE profiles SET xp = ?1, level = ?2, updated_at = ?3 WHERE id = ?4",
        params![stored, i64::from(level_for_xp(xp)), format_ts(at), user_id],
    )?;
    Ok(())
}

pub(crate) fn insert_notification(
    tx: &Connection,
    user_id: &str,
    draft: &NotificationDraft,
    at: &DateTime<Utc>,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    tx.execute(
        "INSERT INTO notifications (id, user_id, kind, title, message, data, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        params![
            id,
            user_id,
            draft.kind.as_str(),
            draft.title,
            draft.message,
            serde_json::to_string(&draft.data)?,
            format_ts(at),
        ],
    )?;
    Ok(id)
}

impl XpStore for Database {
    fn record_award(&self, award: &XpAward, notify: bool) -> Result<AwardOutcome> {
        self.in_transaction(|tx| {
            let (previous_xp, previous_level) = read_snapshot(tx, &award.user_id)?;
            let (new_xp, new_level) = award.apply_to(previous_xp)?;
            let now = Utc::now();

            let transaction = XpTransaction {
                id: Uuid::new_v4().to_string(),
                user_id: award.user_id.clone(),
                amount: award.amount,
                source: award.source,
                source_id: award.source_id.clone(),
                description: award.description.clone(),
                created_at: now,
            };
            tx.execute(
                "INSERT INTO xp_transactions (id, user_id, amount, source, source_id, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    transaction.id,
                    transaction.user_id,
                    transaction.amount,
                    transaction.source.as_str(),
                    transaction.source_id,
                    transaction.description,
                    format_ts(&transaction.created_at),
                ],
            )?;
            write_snapshot(tx, &award.user_id, new_xp, &now)?;

            if notify {
                for draft in award_notifications(award, previous_level, new_level) {
                    insert_notification(tx, &award.user_id, &draft, &now)?;
                }
            }

            Ok(AwardOutcome {
                transaction,
                previous_xp,
                previous_level,
                new_xp,
                new_level,
                leveled_up: new_level > previous_level,
            })
        })
    }
}

impl Database {
    /// Ledger rows for a user, newest first.
    pub fn xp_history(&self, user_id: &str, filter: &XpHistoryFilter) -> Result<Vec<XpTransaction>> {
        let mut sql = String::from(
            "SELECT id, user_id, amount, source, source_id, description, created_at
             FROM xp_transactions WHERE user_id = ?1",
        );
        let mut args: Vec<String> = vec![user_id.to_string()];
        if let Some(source) = filter.source {
            args.push(source.as_str().to_string());
            sql.push_str(&format!(" AND source = ?{}", args.len()));
        }
        if let Some(since) = filter.since {
            args.push(format_ts(&since));
            sql.push_str(&format!(" AND created_at >= ?{}", args.len()));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), row_to_transaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Sum of every ledger row for a user.
    pub fn ledger_total(&self, user_id: &str) -> Result<u64> {
        let total: i64 = self.conn().query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM xp_transactions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(to_u64(0, total)?)
    }

    /// Rebuild the progress snapshot from the ledger.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown user.
    pub fn recompute_progress(&self, user_id: &str) -> Result<UserProgress> {
        let (stored_xp, xp) = self.in_transaction(|tx| {
            let (stored_xp, _) = read_snapshot(tx, user_id)?;
            let total: i64 = tx.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM xp_transactions WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            let xp = to_u64(0, total)?;
            write_snapshot(tx, user_id, xp, &Utc::now())?;
            Ok((stored_xp, xp))
        })?;

        if stored_xp != xp {
            tracing::warn!(user_id, stored_xp, ledger_xp = xp, "progress snapshot repaired");
        }
        Ok(UserProgress {
            user_id: user_id.to_string(),
            xp,
            level: level_for_xp(xp),
        })
    }
}
