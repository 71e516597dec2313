//! # Yasuke Core Library
//!
//! This library provides the core logic for Path of Yasuke, a gamified
//! personal-development tracker. Users follow growth paths broken into goals
//! and activities, keep a journal, complete daily quests, and earn XP and
//! levels for all of it. Every operation is available through the `yasuke`
//! CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Leveling**: pure XP-to-level math plus `award_xp`, which appends to the
//!   XP ledger and moves the progress snapshot in one transaction
//! - **Streaks**: consecutive-day runs over timestamped events
//! - **Storage**: SQLite persistence for every entity and TOML configuration
//! - **Progress**: completion flows that grant XP and keep path progress current
//!
//! ## Key Components
//!
//! - [`XpSystem`]: grants XP through an [`XpStore`]
//! - [`StreakCalculator`]: current and longest streaks
//! - [`Database`]: the store, one connection owned by the caller
//! - [`Progress`]: goal, activity, quest and journal flows
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod growth;
pub mod journal;
pub mod leveling;
pub mod notification;
pub mod profile;
pub mod progress;
pub mod quest;
pub mod stats;
pub mod storage;
pub mod streak;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use growth::{Activity, Goal, GoalStatus, Path, Virtue, SAMURAI_VIRTUES};
pub use journal::JournalEntry;
pub use leveling::{
    level_for_xp, progress_to_next_level, xp_for_next_level, xp_threshold_for_level,
    xp_to_next_level, AwardOutcome, LevelProgress, XpSource, XpStore, XpSystem, XpTransaction,
};
pub use notification::{Notification, NotificationDraft, NotificationKind};
pub use profile::{Profile, SubscriptionTier, UserProgress};
pub use progress::{ActivityUpdate, GoalUpdate, JournalUpdate, Progress, QuestUpdate};
pub use quest::{DailyQuest, QuestType};
pub use stats::{DayActivity, ProfileStats};
pub use storage::{Config, Database, XpHistoryFilter};
pub use streak::{DayBoundary, StreakCalculator, StreakSummary, StreakTracker};
