//! Awarding XP.
//!
//! An award appends one ledger row and moves the user's progress snapshot
//! forward. Both writes (plus the notifications they produce) happen behind
//! the [`XpStore`] seam, which must apply them atomically.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::level_for_xp;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::notification::{NotificationDraft, NotificationKind};

/// What earned the XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Quest,
    Goal,
    Activity,
    Journal,
    Streak,
    Achievement,
}

impl XpSource {
    pub const ALL: [XpSource; 6] = [
        XpSource::Quest,
        XpSource::Goal,
        XpSource::Activity,
        XpSource::Journal,
        XpSource::Streak,
        XpSource::Achievement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            XpSource::Quest => "quest",
            XpSource::Goal => "goal",
            XpSource::Activity => "activity",
            XpSource::Journal => "journal",
            XpSource::Streak => "streak",
            XpSource::Achievement => "achievement",
        }
    }
}

impl fmt::Display for XpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XpSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XpSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| ValidationError::invalid("source", format!("unknown XP source '{s}'")))
    }
}

/// One row of the append-only XP ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub source: XpSource,
    pub source_id: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated award request, ready to be applied by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpAward {
    pub user_id: String,
    pub amount: i64,
    pub source: XpSource,
    pub source_id: String,
    pub description: Option<String>,
}

impl XpAward {
    /// Validate and build an award. Rejects empty user ids and non-positive
    /// amounts.
    pub fn new(
        user_id: &str,
        amount: i64,
        source: XpSource,
        source_id: &str,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::invalid("user_id", "must not be empty"));
        }
        if amount <= 0 {
            return Err(ValidationError::invalid(
                "amount",
                format!("must be a positive number of XP, got {amount}"),
            ));
        }
        Ok(Self {
            user_id: user_id.to_string(),
            amount,
            source,
            source_id: source_id.to_string(),
            description: description.map(str::to_string),
        })
    }

    /// Snapshot after applying this award to `previous_xp`.
    ///
    /// # Errors
    /// Returns a validation error if the total would overflow.
    pub fn apply_to(&self, previous_xp: u64) -> Result<(u64, u32), ValidationError> {
        let new_xp = previous_xp
            .checked_add(self.amount as u64)
            .filter(|xp| i64::try_from(*xp).is_ok())
            .ok_or_else(|| ValidationError::invalid("amount", "XP total would overflow"))?;
        Ok((new_xp, level_for_xp(new_xp)))
    }
}

/// Result of a successful award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardOutcome {
    pub transaction: XpTransaction,
    pub previous_xp: u64,
    pub previous_level: u32,
    pub new_xp: u64,
    pub new_level: u32,
    pub leveled_up: bool,
}

impl AwardOutcome {
    /// Events callers should react to, in the order they happened.
    pub fn events(&self) -> Vec<Event> {
        let at = self.transaction.created_at;
        let mut events = vec![Event::XpGained {
            user_id: self.transaction.user_id.clone(),
            amount: self.transaction.amount,
            source: self.transaction.source,
            new_xp: self.new_xp,
            at,
        }];
        if self.leveled_up {
            events.push(Event::LevelUp {
                user_id: self.transaction.user_id.clone(),
                old_level: self.previous_level,
                new_level: self.new_level,
                at,
            });
        }
        events
    }
}

/// Notifications produced by an award: always one `xp_gained`, plus a
/// `level_up` when the level increased.
pub fn award_notifications(
    award: &XpAward,
    previous_level: u32,
    new_level: u32,
) -> Vec<NotificationDraft> {
    let mut drafts = vec![NotificationDraft {
        kind: NotificationKind::XpGained,
        title: format!("+{} XP Earned!", award.amount),
        message: award
            .description
            .clone()
            .unwrap_or_else(|| format!("You earned {} XP from {}", award.amount, award.source)),
        data: serde_json::json!({
            "amount": award.amount,
            "source": award.source,
            "source_id": award.source_id,
        }),
    }];

    if new_level > previous_level {
        drafts.push(NotificationDraft {
            kind: NotificationKind::LevelUp,
            title: "Level Up!".to_string(),
            message: format!("Congratulations! You've reached Level {new_level}"),
            data: serde_json::json!({
                "new_level": new_level,
                "old_level": previous_level,
            }),
        });
    }
    drafts
}

/// Storage seam for awards.
///
/// Implementations must apply the ledger insert, the snapshot update and the
/// notification inserts as one unit: either all of them persist or none do.
pub trait XpStore {
    fn record_award(&self, award: &XpAward, notify: bool) -> Result<AwardOutcome>;
}

/// Entry point for granting XP.
pub struct XpSystem<'a, S: XpStore + ?Sized> {
    store: &'a S,
    notify: bool,
}

impl<'a, S: XpStore + ?Sized> XpSystem<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            notify: true,
        }
    }

    /// Toggle the `xp_gained`/`level_up` notifications.
    pub fn with_notifications(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Grant `amount` XP to `user_id`.
    ///
    /// # Errors
    /// Returns a validation error for an empty user id or a non-positive
    /// amount (nothing is written), and propagates any store failure.
    pub fn award_xp(
        &self,
        user_id: &str,
        amount: i64,
        source: XpSource,
        source_id: &str,
        description: Option<&str>,
    ) -> Result<AwardOutcome> {
        let award = XpAward::new(user_id, amount, source, source_id, description)?;
        let outcome = self.store.record_award(&award, self.notify)?;

        tracing::info!(
            user_id = %award.user_id,
            amount = award.amount,
            source = %award.source,
            new_xp = outcome.new_xp,
            new_level = outcome.new_level,
            "xp awarded"
        );
        if outcome.leveled_up {
            tracing::info!(
                user_id = %award.user_id,
                old_level = outcome.previous_level,
                new_level = outcome.new_level,
                "level up"
            );
        }
        Ok(outcome)
    }
}
