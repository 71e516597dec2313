mod config;
pub mod database;
mod growth_db;
mod journal_db;
mod ledger;
pub mod migrations;
mod notifications_db;
mod quest_db;

pub use config::{Config, NotificationsConfig, ProfileConfig, RewardsConfig, StreakConfig};
pub use database::Database;
pub use ledger::XpHistoryFilter;

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/yasuke[-dev]/` based on YASUKE_ENV.
///
/// Set YASUKE_ENV=dev to use the development data directory, or
/// YASUKE_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("YASUKE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("YASUKE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("yasuke-dev")
            } else {
                base_dir.join("yasuke")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
