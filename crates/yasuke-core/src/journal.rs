//! Honor journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const MOOD_MIN: u8 = 1;
pub const MOOD_MAX: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub content: String,
    /// 1..=5
    pub mood: Option<u8>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: None,
            content: content.into(),
            mood: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::invalid("content", "must not be empty"));
        }
        if let Some(mood) = self.mood {
            if !(MOOD_MIN..=MOOD_MAX).contains(&mood) {
                return Err(ValidationError::OutOfRange {
                    field: "mood".into(),
                    value: i64::from(mood),
                    min: i64::from(MOOD_MIN),
                    max: i64::from(MOOD_MAX),
                });
            }
        }
        Ok(())
    }
}

/// Mean of the moods that were recorded; 0.0 when none were.
pub fn average_mood(entries: &[JournalEntry]) -> f64 {
    let moods: Vec<f64> = entries
        .iter()
        .filter_map(|e| e.mood.map(f64::from))
        .collect();
    if moods.is_empty() {
        0.0
    } else {
        moods.iter().sum::<f64>() / moods.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_must_be_in_range() {
        let mut entry = JournalEntry::new("u1", "Sat with the morning");
        entry.mood = Some(5);
        assert!(entry.validate().is_ok());
        entry.mood = Some(0);
        assert!(entry.validate().is_err());
        entry.mood = Some(6);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn empty_content_is_invalid() {
        assert!(JournalEntry::new("u1", "\n").validate().is_err());
    }

    #[test]
    fn average_ignores_missing_moods() {
        let mut a = JournalEntry::new("u1", "a");
        a.mood = Some(4);
        let mut b = JournalEntry::new("u1", "b");
        b.mood = Some(2);
        let c = JournalEntry::new("u1", "c");
        assert_eq!(average_mood(&[a, b, c]), 3.0);
        assert_eq!(average_mood(&[]), 0.0);
    }
}
