use chrono::Utc;
use clap::Subcommand;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Path, goal, journal and XP totals
    Profile,
    /// XP per day for the current week (Sunday start)
    Weekly,
}

pub fn run(action: StatsAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let config = ctx.config()?;
    let user_id = ctx.user_id(&db)?;

    match action {
        StatsAction::Profile => {
            let stats = db.profile_stats(&user_id, &config, Utc::now())?;
            print_json(&stats)?;
        }
        StatsAction::Weekly => {
            let days = db.weekly_activity(&user_id, &config, Utc::now())?;
            print_json(&days)?;
        }
    }
    Ok(())
}
