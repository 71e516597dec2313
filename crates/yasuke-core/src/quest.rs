//! Daily quests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const DEFAULT_QUEST_XP: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Meditation,
    Exercise,
    Reading,
    Journaling,
    #[default]
    Custom,
}

impl QuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestType::Meditation => "meditation",
            QuestType::Exercise => "exercise",
            QuestType::Reading => "reading",
            QuestType::Journaling => "journaling",
            QuestType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "meditation" => Ok(QuestType::Meditation),
            "exercise" => Ok(QuestType::Exercise),
            "reading" => Ok(QuestType::Reading),
            "journaling" => Ok(QuestType::Journaling),
            "custom" => Ok(QuestType::Custom),
            other => Err(ValidationError::invalid(
                "quest_type",
                format!("unknown quest type '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuest {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub quest_type: QuestType,
    pub xp_reward: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DailyQuest {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: String::new(),
            quest_type: QuestType::Custom,
            xp_reward: DEFAULT_QUEST_XP,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::invalid("title", "must not be empty"));
        }
        if self.xp_reward <= 0 {
            return Err(ValidationError::invalid(
                "xp_reward",
                format!("must be positive, got {}", self.xp_reward),
            ));
        }
        if self.completed != self.completed_at.is_some() {
            return Err(ValidationError::invalid(
                "completed_at",
                "must be set exactly when the quest is completed",
            ));
        }
        Ok(())
    }
}

/// The starter set every user gets when they have no quests yet.
pub fn default_quests(user_id: &str) -> Vec<DailyQuest> {
    [
        (
            "Morning Meditation",
            "Start your day with 10 minutes of mindfulness",
            50,
            QuestType::Meditation,
        ),
        (
            "Read 10 Pages",
            "Expand your knowledge through reading",
            30,
            QuestType::Reading,
        ),
        (
            "Exercise 30 Minutes",
            "Strengthen your body and discipline",
            75,
            QuestType::Exercise,
        ),
        (
            "Journal Reflection",
            "Reflect on your day and growth",
            40,
            QuestType::Journaling,
        ),
    ]
    .into_iter()
    .map(|(title, description, xp_reward, quest_type)| {
        let mut quest = DailyQuest::new(user_id, title);
        quest.description = description.to_string();
        quest.xp_reward = xp_reward;
        quest.quest_type = quest_type;
        quest
    })
    .collect()
}
