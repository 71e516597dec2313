//! Growth paths, their goals, and the activities under each goal.
//!
//! A path's progress is the share of its goals that are completed.

mod virtue;

pub use virtue::{find_virtue, Virtue, SAMURAI_VIRTUES};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const DEFAULT_PATH_COLOR: &str = "yasuke-crimson";
pub const DEFAULT_GOAL_XP: i64 = 50;
pub const DEFAULT_ACTIVITY_XP: i64 = 25;

fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_reward(field: &str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::invalid(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

/// Completed share of `total` goals, rounded half-up. Zero goals is 0%.
pub fn path_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub color: String,
    /// 0..=100
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Path {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            color: DEFAULT_PATH_COLOR.to_string(),
            progress: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        if self.progress > 100 {
            return Err(ValidationError::OutOfRange {
                field: "progress".into(),
                value: i64::from(self.progress),
                min: 0,
                max: 100,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Paused,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Paused => "paused",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pending" => Ok(GoalStatus::Pending),
            "in_progress" => Ok(GoalStatus::InProgress),
            "completed" => Ok(GoalStatus::Completed),
            "paused" => Ok(GoalStatus::Paused),
            other => Err(ValidationError::invalid(
                "status",
                format!("unknown goal status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub path_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// Id from [`SAMURAI_VIRTUES`].
    pub virtue: Option<String>,
    pub status: GoalStatus,
    pub completed: bool,
    pub xp_reward: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(path_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            path_id: path_id.into(),
            title: title.into(),
            description: None,
            due_date: None,
            virtue: None,
            status: GoalStatus::Pending,
            completed: false,
            xp_reward: DEFAULT_GOAL_XP,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_reward("xp_reward", self.xp_reward)?;
        if let Some(virtue) = &self.virtue {
            if find_virtue(virtue).is_none() {
                return Err(ValidationError::invalid(
                    "virtue",
                    format!("unknown virtue '{virtue}'"),
                ));
            }
        }
        if self.completed != (self.status == GoalStatus::Completed) {
            return Err(ValidationError::invalid(
                "status",
                "completed flag and status disagree",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub goal_id: String,
    pub note: String,
    pub completed: bool,
    pub xp_reward: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(goal_id: impl Into<String>, note: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.into(),
            note: note.into(),
            completed: false,
            xp_reward: DEFAULT_ACTIVITY_XP,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("note", &self.note)?;
        require_reward("xp_reward", self.xp_reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_half_up() {
        assert_eq!(path_progress(0, 0), 0);
        assert_eq!(path_progress(0, 3), 0);
        assert_eq!(path_progress(1, 3), 33);
        assert_eq!(path_progress(2, 3), 67);
        assert_eq!(path_progress(1, 8), 13);
        assert_eq!(path_progress(3, 3), 100);
        assert_eq!(path_progress(5, 3), 100);
    }

    #[test]
    fn goal_defaults() {
        let goal = Goal::new("p1", "Run a marathon");
        assert_eq!(goal.status, GoalStatus::Pending);
        assert_eq!(goal.xp_reward, 50);
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn goal_rejects_unknown_virtue() {
        let mut goal = Goal::new("p1", "Speak up");
        goal.virtue = Some("courage".into());
        assert!(goal.validate().is_ok());
        goal.virtue = Some("bravado".into());
        assert!(goal.validate().is_err());
    }

    #[test]
    fn goal_rejects_mismatched_completion() {
        let mut goal = Goal::new("p1", "Finish");
        goal.completed = true;
        assert!(goal.validate().is_err());
        goal.status = GoalStatus::Completed;
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn blank_titles_and_zero_rewards_are_invalid() {
        assert!(Path::new("u1", "  ").validate().is_err());
        let mut activity = Activity::new("g1", "Stretch");
        activity.xp_reward = 0;
        assert!(activity.validate().is_err());
    }

    #[test]
    fn status_parse_round_trip() {
        for status in [
            GoalStatus::Pending,
            GoalStatus::InProgress,
            GoalStatus::Completed,
            GoalStatus::Paused,
        ] {
            assert_eq!(GoalStatus::parse(status.as_str()).unwrap(), status);
        }
    }
}
