//! User profiles and the XP/level snapshot stored on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::leveling::{level_for_xp, LevelProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
    Team,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Team => "team",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "free" => Ok(SubscriptionTier::Free),
            "pro" => Ok(SubscriptionTier::Pro),
            "team" => Ok(SubscriptionTier::Team),
            other => Err(ValidationError::invalid(
                "subscription_tier",
                format!("unknown tier '{other}'"),
            )),
        }
    }
}

pub const DEFAULT_RESILIENCE_SCORE: i64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub level: u32,
    pub xp: u64,
    /// Current journal streak as of the last journal write.
    pub streak: u32,
    pub resilience_score: i64,
    pub subscription_tier: SubscriptionTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A fresh level-1 profile.
    pub fn new(id: impl Into<String>, email: impl Into<String>, full_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: email.into(),
            full_name: full_name.into(),
            avatar_url: None,
            level: 1,
            xp: 0,
            streak: 0,
            resilience_score: DEFAULT_RESILIENCE_SCORE,
            subscription_tier: SubscriptionTier::Free,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn progress(&self) -> UserProgress {
        UserProgress {
            user_id: self.id.clone(),
            xp: self.xp,
            level: self.level,
        }
    }

    pub fn level_progress(&self) -> LevelProgress {
        LevelProgress::from_xp(self.xp)
    }
}

/// The cached `(xp, level)` pair for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub xp: u64,
    pub level: u32,
}

impl UserProgress {
    /// Whether `level` still matches the curve for `xp`.
    pub fn is_consistent(&self) -> bool {
        self.level == level_for_xp(self.xp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_starts_at_level_one() {
        let profile = Profile::new("u1", "a@b.c", "Yasuke");
        assert_eq!(profile.level, 1);
        assert_eq!(profile.xp, 0);
        assert_eq!(profile.resilience_score, 50);
        assert!(profile.progress().is_consistent());
    }

    #[test]
    fn tier_parse() {
        assert_eq!(SubscriptionTier::parse("pro").unwrap(), SubscriptionTier::Pro);
        assert!(SubscriptionTier::parse("gold").is_err());
    }

    #[test]
    fn inconsistent_snapshot_is_detected() {
        let progress = UserProgress {
            user_id: "u1".into(),
            xp: 120,
            level: 1,
        };
        assert!(!progress.is_consistent());
    }
}
