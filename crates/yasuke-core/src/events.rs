use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::leveling::XpSource;

/// State changes callers may want to react to (toasts, badges, push).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    XpGained {
        user_id: String,
        amount: i64,
        source: XpSource,
        new_xp: u64,
        at: DateTime<Utc>,
    },
    LevelUp {
        user_id: String,
        old_level: u32,
        new_level: u32,
        at: DateTime<Utc>,
    },
    /// Every activity of a goal is done; the goal itself is still open.
    GoalReady {
        goal_id: String,
        at: DateTime<Utc>,
    },
    PathProgressChanged {
        path_id: String,
        progress: u8,
        at: DateTime<Utc>,
    },
}
