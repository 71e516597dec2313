//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of notification. Stored as its string form; unknown kinds survive a
/// round trip through [`NotificationKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    XpGained,
    LevelUp,
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::XpGained => "xp_gained",
            NotificationKind::LevelUp => "level_up",
            NotificationKind::Other(kind) => kind,
        }
    }
}

impl From<String> for NotificationKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "xp_gained" => NotificationKind::XpGained,
            "level_up" => NotificationKind::LevelUp,
            _ => NotificationKind::Other(kind),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A notification that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for raw in ["xp_gained", "level_up", "reminder"] {
            let kind = NotificationKind::from(raw.to_string());
            assert_eq!(String::from(kind), raw);
        }
        assert_eq!(
            NotificationKind::from("level_up".to_string()),
            NotificationKind::LevelUp
        );
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&NotificationKind::XpGained).unwrap();
        assert_eq!(json, "\"xp_gained\"");
    }
}
