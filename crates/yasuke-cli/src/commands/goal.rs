//! Goal commands.
//!
//! Completing a goal awards its XP and refreshes the path's progress.

use chrono::NaiveDate;
use clap::Subcommand;
use yasuke_core::{Goal, GoalStatus, GoalUpdate, Progress};

use super::{ensure_owner, goal_owner, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Add a goal to a path
    Add {
        /// Path ID
        path_id: String,
        /// Goal title
        title: String,
        /// Goal description
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Virtue ID (rectitude, courage, benevolence, respect, honesty, honor, loyalty)
        #[arg(long)]
        virtue: Option<String>,
        /// XP reward (default: rewards.goal_default from config)
        #[arg(long)]
        xp: Option<i64>,
    },
    /// List goals of a path, or of every path
    List {
        /// Filter by path ID
        #[arg(long)]
        path_id: Option<String>,
    },
    /// Complete a goal
    Complete {
        /// Goal ID
        id: String,
    },
    /// Reopen a completed goal
    Reopen {
        /// Goal ID
        id: String,
    },
    /// Set a goal's status
    Status {
        /// Goal ID
        id: String,
        /// pending, in_progress, completed or paused
        status: String,
    },
    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,
    },
}

fn print_update(update: &GoalUpdate) -> CmdResult {
    print_json(&serde_json::json!({
        "goal": update.goal,
        "award": update.award,
        "path_progress": update.path_progress,
        "events": update.events(),
    }))
}

pub fn run(action: GoalAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let config = ctx.config()?;
    let user_id = ctx.user_id(&db)?;
    let progress = Progress::new(&db, &config);

    match action {
        GoalAction::Add {
            path_id,
            title,
            description,
            due,
            virtue,
            xp,
        } => {
            let path = db.require_path(&path_id)?;
            ensure_owner(&path.user_id, &user_id, "path", &path_id)?;
            let mut goal = Goal::new(&path_id, title);
            goal.description = description;
            goal.due_date = due;
            goal.virtue = virtue;
            goal.xp_reward = xp.unwrap_or(config.rewards.goal_default);
            progress.add_goal(&goal)?;
            print_json(&goal)?;
        }
        GoalAction::List { path_id } => {
            let goals = match path_id {
                Some(path_id) => {
                    let path = db.require_path(&path_id)?;
                    ensure_owner(&path.user_id, &user_id, "path", &path_id)?;
                    db.list_goals(&path_id)?
                }
                None => db.list_user_goals(&user_id)?,
            };
            print_json(&goals)?;
        }
        GoalAction::Complete { id } => {
            ensure_owner(&goal_owner(&db, &id)?, &user_id, "goal", &id)?;
            print_update(&progress.complete_goal(&id)?)?;
        }
        GoalAction::Reopen { id } => {
            ensure_owner(&goal_owner(&db, &id)?, &user_id, "goal", &id)?;
            print_update(&progress.reopen_goal(&id)?)?;
        }
        GoalAction::Status { id, status } => {
            let status = GoalStatus::parse(&status)?;
            ensure_owner(&goal_owner(&db, &id)?, &user_id, "goal", &id)?;
            print_update(&progress.set_goal_status(&id, status)?)?;
        }
        GoalAction::Delete { id } => {
            ensure_owner(&goal_owner(&db, &id)?, &user_id, "goal", &id)?;
            let path_progress = progress.delete_goal(&id)?;
            println!("Goal deleted: {id} (path progress {path_progress}%)");
        }
    }
    Ok(())
}
