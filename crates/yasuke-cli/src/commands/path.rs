//! Growth path commands.

use clap::Subcommand;
use yasuke_core::Path;

use super::{ensure_owner, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum PathAction {
    /// Create a new path
    Create {
        /// Path title
        title: String,
        /// Path description
        #[arg(long)]
        description: Option<String>,
        /// Display color (default: yasuke-crimson)
        #[arg(long)]
        color: Option<String>,
    },
    /// List the user's paths
    List,
    /// Show a path with its goals
    Show {
        /// Path ID
        id: String,
    },
    /// Delete a path, its goals and their activities
    Delete {
        /// Path ID
        id: String,
    },
}

pub fn run(action: PathAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let user_id = ctx.user_id(&db)?;

    match action {
        PathAction::Create {
            title,
            description,
            color,
        } => {
            let mut path = Path::new(&user_id, title);
            path.description = description;
            if let Some(color) = color {
                path.color = color;
            }
            db.create_path(&path)?;
            print_json(&path)?;
        }
        PathAction::List => {
            print_json(&db.list_paths(&user_id)?)?;
        }
        PathAction::Show { id } => {
            let path = db.require_path(&id)?;
            ensure_owner(&path.user_id, &user_id, "path", &id)?;
            let goals = db.list_goals(&id)?;
            print_json(&serde_json::json!({
                "path": path,
                "goals": goals,
            }))?;
        }
        PathAction::Delete { id } => {
            let path = db.require_path(&id)?;
            ensure_owner(&path.user_id, &user_id, "path", &id)?;
            db.delete_path(&id)?;
            println!("Path deleted: {id}");
        }
    }
    Ok(())
}
