//! Subcommand implementations. Each module exposes an `Action` enum and a
//! `run` function.

pub mod activity;
pub mod config;
pub mod goal;
pub mod journal;
pub mod notify;
pub mod path;
pub mod profile;
pub mod quest;
pub mod stats;
pub mod xp;

use yasuke_core::{Config, CoreError, Database};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Per-invocation state shared by every command.
pub struct Context {
    user: Option<String>,
}

impl Context {
    pub fn new(user: Option<String>) -> Self {
        Self { user }
    }

    pub fn open_db(&self) -> Result<Database, CoreError> {
        Database::open()
    }

    pub fn config(&self) -> Result<Config, CoreError> {
        Config::load()
    }

    /// The `--user` override if given, otherwise the active user.
    pub fn user_id(&self, db: &Database) -> Result<String, Box<dyn std::error::Error>> {
        if let Some(user) = &self.user {
            db.require_profile(user)?;
            return Ok(user.clone());
        }
        db.active_user()?.ok_or_else(|| {
            "no active user; run `yasuke profile create` or `yasuke profile use <id>`".into()
        })
    }
}

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Split a comma-separated flag value, dropping empty items.
pub fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Another user's records are reported as missing.
pub fn ensure_owner(owner: &str, user_id: &str, entity: &'static str, id: &str) -> Result<(), CoreError> {
    if owner == user_id {
        Ok(())
    } else {
        Err(CoreError::not_found(entity, id))
    }
}

/// Owner of the path a goal sits on.
pub fn goal_owner(db: &Database, goal_id: &str) -> Result<String, CoreError> {
    let goal = db.require_goal(goal_id)?;
    Ok(db.require_path(&goal.path_id)?.user_id)
}
