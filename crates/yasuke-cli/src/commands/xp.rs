//! XP commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use yasuke_core::{LevelProgress, XpHistoryFilter, XpSource, XpSystem};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum XpAction {
    /// Grant XP to the user
    Award {
        /// Amount of XP (must be positive)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        /// quest, goal, activity, journal, streak or achievement
        #[arg(long, default_value = "achievement")]
        source: XpSource,
        /// ID of whatever earned the XP
        #[arg(long, default_value = "manual")]
        source_id: String,
        /// Ledger description
        #[arg(long)]
        description: Option<String>,
    },
    /// Show level progress for the user, or for an arbitrary XP total
    Level {
        /// XP total to evaluate instead of the user's
        #[arg(long)]
        xp: Option<u64>,
    },
    /// Show the XP ledger, newest first
    History {
        /// Only this source
        #[arg(long)]
        source: Option<XpSource>,
        /// Only rows at or after this RFC 3339 timestamp
        #[arg(long)]
        since: Option<DateTime<Utc>>,
        /// Maximum rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rebuild XP and level from the ledger
    Recompute,
}

pub fn run(action: XpAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;

    match action {
        XpAction::Award {
            amount,
            source,
            source_id,
            description,
        } => {
            let config = ctx.config()?;
            let user_id = ctx.user_id(&db)?;
            let outcome = XpSystem::new(&db)
                .with_notifications(config.notifications.enabled)
                .award_xp(&user_id, amount, source, &source_id, description.as_deref())?;
            let events = outcome.events();
            print_json(&serde_json::json!({
                "award": outcome,
                "events": events,
            }))?;
        }
        XpAction::Level { xp } => {
            let progress = match xp {
                Some(xp) => LevelProgress::from_xp(xp),
                None => {
                    let user_id = ctx.user_id(&db)?;
                    db.require_profile(&user_id)?.level_progress()
                }
            };
            print_json(&progress)?;
        }
        XpAction::History {
            source,
            since,
            limit,
        } => {
            let user_id = ctx.user_id(&db)?;
            let filter = XpHistoryFilter {
                source,
                since,
                limit,
            };
            print_json(&db.xp_history(&user_id, &filter)?)?;
        }
        XpAction::Recompute => {
            let user_id = ctx.user_id(&db)?;
            print_json(&db.recompute_progress(&user_id)?)?;
        }
    }
    Ok(())
}
