//! Daily quest commands.

use chrono::Utc;
use clap::Subcommand;
use yasuke_core::{DailyQuest, Database, Progress, QuestType, QuestUpdate};

use super::{ensure_owner, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum QuestAction {
    /// List quests, seeding the starter set for a new user
    List,
    /// Insert the starter quests if the user has none
    Seed,
    /// Add a custom quest
    Add {
        /// Quest title
        title: String,
        /// Quest description
        #[arg(long, default_value = "")]
        description: String,
        /// meditation, exercise, reading, journaling or custom
        #[arg(long = "type", default_value = "custom")]
        quest_type: String,
        /// XP reward (default: rewards.quest_default from config)
        #[arg(long)]
        xp: Option<i64>,
    },
    /// Complete a quest
    Complete {
        /// Quest ID
        id: String,
    },
    /// Reopen a quest
    Reopen {
        /// Quest ID
        id: String,
    },
    /// Current and longest quest streak
    Streak,
}

fn check_quest(db: &Database, id: &str, user_id: &str) -> CmdResult {
    let quest = db.require_quest(id)?;
    ensure_owner(&quest.user_id, user_id, "quest", id)?;
    Ok(())
}

fn print_update(update: &QuestUpdate) -> CmdResult {
    print_json(&serde_json::json!({
        "quest": update.quest,
        "award": update.award,
        "events": update.events(),
    }))
}

pub fn run(action: QuestAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let config = ctx.config()?;
    let user_id = ctx.user_id(&db)?;
    let progress = Progress::new(&db, &config);

    match action {
        QuestAction::List => {
            db.seed_default_quests(&user_id)?;
            print_json(&db.list_quests(&user_id)?)?;
        }
        QuestAction::Seed => {
            let seeded = db.seed_default_quests(&user_id)?;
            println!("Seeded {} quests", seeded.len());
        }
        QuestAction::Add {
            title,
            description,
            quest_type,
            xp,
        } => {
            let mut quest = DailyQuest::new(&user_id, title);
            quest.description = description;
            quest.quest_type = QuestType::parse(&quest_type)?;
            quest.xp_reward = xp.unwrap_or(config.rewards.quest_default);
            db.create_quest(&quest)?;
            print_json(&quest)?;
        }
        QuestAction::Complete { id } => {
            check_quest(&db, &id, &user_id)?;
            print_update(&progress.complete_quest(&id)?)?;
        }
        QuestAction::Reopen { id } => {
            check_quest(&db, &id, &user_id)?;
            print_update(&progress.reopen_quest(&id)?)?;
        }
        QuestAction::Streak => {
            print_json(&progress.quest_streak(&user_id, Utc::now())?)?;
        }
    }
    Ok(())
}
