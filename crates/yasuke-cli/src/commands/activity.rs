//! Activity commands.

use clap::Subcommand;
use yasuke_core::{Activity, ActivityUpdate, Database, Progress};

use super::{ensure_owner, goal_owner, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Add an activity to a goal
    Add {
        /// Goal ID
        goal_id: String,
        /// What to do
        note: String,
        /// XP reward (default: rewards.activity_default from config)
        #[arg(long)]
        xp: Option<i64>,
    },
    /// List activities of a goal
    List {
        /// Goal ID
        goal_id: String,
    },
    /// Complete an activity
    Complete {
        /// Activity ID
        id: String,
    },
    /// Reopen an activity
    Reopen {
        /// Activity ID
        id: String,
    },
    /// Delete an activity
    Delete {
        /// Activity ID
        id: String,
    },
}

fn check_activity(db: &Database, id: &str, user_id: &str) -> CmdResult {
    let activity = db.require_activity(id)?;
    ensure_owner(&goal_owner(db, &activity.goal_id)?, user_id, "activity", id)?;
    Ok(())
}

fn print_update(update: &ActivityUpdate) -> CmdResult {
    print_json(&serde_json::json!({
        "activity": update.activity,
        "award": update.award,
        "all_activities_completed": update.all_activities_completed,
        "events": update.events(),
    }))
}

pub fn run(action: ActivityAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let config = ctx.config()?;
    let user_id = ctx.user_id(&db)?;
    let progress = Progress::new(&db, &config);

    match action {
        ActivityAction::Add { goal_id, note, xp } => {
            ensure_owner(&goal_owner(&db, &goal_id)?, &user_id, "goal", &goal_id)?;
            let mut activity = Activity::new(&goal_id, note);
            activity.xp_reward = xp.unwrap_or(config.rewards.activity_default);
            db.create_activity(&activity)?;
            print_json(&activity)?;
        }
        ActivityAction::List { goal_id } => {
            ensure_owner(&goal_owner(&db, &goal_id)?, &user_id, "goal", &goal_id)?;
            print_json(&db.list_activities(&goal_id)?)?;
        }
        ActivityAction::Complete { id } => {
            check_activity(&db, &id, &user_id)?;
            let update = progress.complete_activity(&id)?;
            if update.all_activities_completed && !update.goal_completed {
                eprintln!("All activities done; consider completing the goal.");
            }
            print_update(&update)?;
        }
        ActivityAction::Reopen { id } => {
            check_activity(&db, &id, &user_id)?;
            print_update(&progress.reopen_activity(&id)?)?;
        }
        ActivityAction::Delete { id } => {
            check_activity(&db, &id, &user_id)?;
            db.delete_activity(&id)?;
            println!("Activity deleted: {id}");
        }
    }
    Ok(())
}
