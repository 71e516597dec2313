//! What happens after a user finishes something.
//!
//! Completing a goal, an activity or a quest, or writing a journal entry,
//! grants XP through [`XpSystem`]. The state change and the award commit
//! together. Reopening never takes XP back, and completing something that
//! is already complete awards nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::events::Event;
use crate::growth::{Activity, Goal, GoalStatus};
use crate::journal::JournalEntry;
use crate::leveling::{AwardOutcome, XpSource, XpSystem};
use crate::quest::DailyQuest;
use crate::storage::{Config, Database};
use crate::streak::StreakSummary;

#[derive(Debug, Clone, Serialize)]
pub struct GoalUpdate {
    pub goal: Goal,
    pub award: Option<AwardOutcome>,
    pub previous_path_progress: u8,
    pub path_progress: u8,
}

impl GoalUpdate {
    pub fn events(&self) -> Vec<Event> {
        let mut events = self.award.as_ref().map(AwardOutcome::events).unwrap_or_default();
        if self.path_progress != self.previous_path_progress {
            events.push(Event::PathProgressChanged {
                path_id: self.goal.path_id.clone(),
                progress: self.path_progress,
                at: self.goal.updated_at,
            });
        }
        events
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityUpdate {
    pub activity: Activity,
    pub award: Option<AwardOutcome>,
    /// Every activity under the goal is now done.
    pub all_activities_completed: bool,
    pub goal_completed: bool,
}

impl ActivityUpdate {
    pub fn events(&self) -> Vec<Event> {
        let mut events = self.award.as_ref().map(AwardOutcome::events).unwrap_or_default();
        if self.all_activities_completed && !self.goal_completed && self.award.is_some() {
            events.push(Event::GoalReady {
                goal_id: self.activity.goal_id.clone(),
                at: self.activity.updated_at,
            });
        }
        events
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestUpdate {
    pub quest: DailyQuest,
    pub award: Option<AwardOutcome>,
}

impl QuestUpdate {
    pub fn events(&self) -> Vec<Event> {
        self.award.as_ref().map(AwardOutcome::events).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalUpdate {
    pub entry: JournalEntry,
    pub award: AwardOutcome,
    pub streak: StreakSummary,
}

/// Progress flows over one store and one configuration.
pub struct Progress<'a> {
    db: &'a Database,
    config: &'a Config,
}

impl<'a> Progress<'a> {
    pub fn new(db: &'a Database, config: &'a Config) -> Self {
        Self { db, config }
    }

    fn xp(&self) -> XpSystem<'a, Database> {
        XpSystem::new(self.db).with_notifications(self.config.notifications.enabled)
    }

    // === Goals ===

    /// Add a goal and refresh its path's progress.
    pub fn add_goal(&self, goal: &Goal) -> Result<u8> {
        self.db.in_transaction(|_| {
            self.db.create_goal(goal)?;
            self.db.update_path_progress(&goal.path_id)
        })
    }

    /// Delete a goal and refresh its path's progress.
    pub fn delete_goal(&self, goal_id: &str) -> Result<u8> {
        let goal = self.db.require_goal(goal_id)?;
        self.db.in_transaction(|_| {
            self.db.delete_goal(goal_id)?;
            self.db.update_path_progress(&goal.path_id)
        })
    }

    /// Move a goal to `status`. Entering `Completed` awards the goal's XP;
    /// leaving it does not remove any.
    pub fn set_goal_status(&self, goal_id: &str, status: GoalStatus) -> Result<GoalUpdate> {
        let goal = self.db.require_goal(goal_id)?;
        let path = self.db.require_path(&goal.path_id)?;
        let completing = status == GoalStatus::Completed && !goal.completed;

        let (award, path_progress) = self.db.in_transaction(|_| {
            self.db.set_goal_status(goal_id, status)?;
            let award = if completing {
                let description = format!("Completed goal: {}", goal.title);
                Some(self.xp().award_xp(
                    &path.user_id,
                    goal.xp_reward,
                    XpSource::Goal,
                    &goal.id,
                    Some(&description),
                )?)
            } else {
                None
            };
            let progress = self.db.update_path_progress(&goal.path_id)?;
            Ok((award, progress))
        })?;

        Ok(GoalUpdate {
            goal: self.db.require_goal(goal_id)?,
            award,
            previous_path_progress: path.progress,
            path_progress,
        })
    }

    pub fn complete_goal(&self, goal_id: &str) -> Result<GoalUpdate> {
        self.set_goal_status(goal_id, GoalStatus::Completed)
    }

    /// Reopen a goal as in progress. Already-open goals keep their status.
    pub fn reopen_goal(&self, goal_id: &str) -> Result<GoalUpdate> {
        let goal = self.db.require_goal(goal_id)?;
        let status = if goal.completed {
            GoalStatus::InProgress
        } else {
            goal.status
        };
        self.set_goal_status(goal_id, status)
    }

    // === Activities ===

    pub fn complete_activity(&self, activity_id: &str) -> Result<ActivityUpdate> {
        self.toggle_activity(activity_id, true)
    }

    pub fn reopen_activity(&self, activity_id: &str) -> Result<ActivityUpdate> {
        self.toggle_activity(activity_id, false)
    }

    fn toggle_activity(&self, activity_id: &str, completed: bool) -> Result<ActivityUpdate> {
        let activity = self.db.require_activity(activity_id)?;
        let goal = self.db.require_goal(&activity.goal_id)?;
        let path = self.db.require_path(&goal.path_id)?;
        let completing = completed && !activity.completed;

        let award = self.db.in_transaction(|_| {
            self.db.set_activity_completed(activity_id, completed)?;
            if !completing {
                return Ok(None);
            }
            let description = format!("Completed activity: {}", activity.note);
            self.xp()
                .award_xp(
                    &path.user_id,
                    activity.xp_reward,
                    XpSource::Activity,
                    &activity.id,
                    Some(&description),
                )
                .map(Some)
        })?;

        let siblings = self.db.list_activities(&goal.id)?;
        Ok(ActivityUpdate {
            activity: self.db.require_activity(activity_id)?,
            award,
            all_activities_completed: !siblings.is_empty() && siblings.iter().all(|a| a.completed),
            goal_completed: goal.completed,
        })
    }

    // === Quests ===

    pub fn complete_quest(&self, quest_id: &str) -> Result<QuestUpdate> {
        let quest = self.db.require_quest(quest_id)?;
        if quest.completed {
            return Ok(QuestUpdate { quest, award: None });
        }

        let award = self.db.in_transaction(|_| {
            self.db.set_quest_completed(quest_id, Some(Utc::now()))?;
            let description = format!("Completed daily quest: {}", quest.title);
            self.xp().award_xp(
                &quest.user_id,
                quest.xp_reward,
                XpSource::Quest,
                &quest.id,
                Some(&description),
            )
        })?;

        Ok(QuestUpdate {
            quest: self.db.require_quest(quest_id)?,
            award: Some(award),
        })
    }

    pub fn reopen_quest(&self, quest_id: &str) -> Result<QuestUpdate> {
        self.db.require_quest(quest_id)?;
        self.db.set_quest_completed(quest_id, None)?;
        Ok(QuestUpdate {
            quest: self.db.require_quest(quest_id)?,
            award: None,
        })
    }

    // === Journal ===

    /// Store a journal entry, award `rewards.journal_entry` XP and refresh the
    /// profile's cached streak.
    pub fn create_journal_entry(&self, entry: JournalEntry, now: DateTime<Utc>) -> Result<JournalUpdate> {
        entry.validate()?;
        let (award, streak) = self.db.in_transaction(|_| {
            self.db.create_journal_entry(&entry)?;
            let award = self.xp().award_xp(
                &entry.user_id,
                self.config.rewards.journal_entry,
                XpSource::Journal,
                &entry.id,
                Some("Created a journal entry"),
            )?;
            let streak = self.journal_streak(&entry.user_id, now)?;
            self.db.set_profile_streak(&entry.user_id, streak.current)?;
            Ok((award, streak))
        })?;

        Ok(JournalUpdate {
            entry,
            award,
            streak,
        })
    }

    // === Streaks ===

    pub fn journal_streak(&self, user_id: &str, now: DateTime<Utc>) -> Result<StreakSummary> {
        let calculator = self.config.streak_calculator()?;
        let parsed = self.db.journal_timestamps(user_id)?;
        Ok(calculator.compute(&parsed.timestamps, now))
    }

    pub fn quest_streak(&self, user_id: &str, now: DateTime<Utc>) -> Result<StreakSummary> {
        let calculator = self.config.streak_calculator()?;
        let parsed = self.db.quest_completion_timestamps(user_id)?;
        Ok(calculator.compute(&parsed.timestamps, now))
    }
}
