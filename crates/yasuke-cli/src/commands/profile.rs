//! Profile commands.
//!
//! The first profile created becomes the active user; `profile use` switches.

use clap::Subcommand;
use uuid::Uuid;
use yasuke_core::Profile;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a profile
    Create {
        /// Email address
        email: String,
        /// Display name (default: profile.default_full_name from config)
        #[arg(long)]
        name: Option<String>,
        /// Profile ID (default: random UUID)
        #[arg(long)]
        id: Option<String>,
        /// Avatar URL
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// Show a profile with its level progress
    Show,
    /// Make a profile the active user
    Use {
        /// Profile ID
        id: String,
    },
    /// List all profiles
    List,
}

pub fn run(action: ProfileAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;

    match action {
        ProfileAction::Create {
            email,
            name,
            id,
            avatar_url,
        } => {
            let config = ctx.config()?;
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let name = name.unwrap_or(config.profile.default_full_name);
            let mut profile = Profile::new(id, email, name);
            profile.avatar_url = avatar_url;
            db.create_profile(&profile)?;
            if db.active_user()?.is_none() {
                db.set_active_user(&profile.id)?;
            }
            print_json(&profile)?;
        }
        ProfileAction::Show => {
            let user_id = ctx.user_id(&db)?;
            let profile = db.require_profile(&user_id)?;
            let level = profile.level_progress();
            print_json(&serde_json::json!({
                "profile": profile,
                "level": level,
            }))?;
        }
        ProfileAction::Use { id } => {
            db.set_active_user(&id)?;
            println!("active user: {id}");
        }
        ProfileAction::List => {
            let profiles = db.list_profiles()?;
            print_json(&profiles)?;
        }
    }
    Ok(())
}
