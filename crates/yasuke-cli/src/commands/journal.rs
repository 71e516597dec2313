//! Journal commands.

use chrono::Utc;
use clap::Subcommand;
use yasuke_core::{JournalEntry, Progress};

use super::{ensure_owner, print_json, split_list, CmdResult, Context};

#[derive(Subcommand)]
pub enum JournalAction {
    /// Write a new entry (awards rewards.journal_entry XP)
    New {
        /// Entry text
        content: String,
        /// Entry title
        #[arg(long)]
        title: Option<String>,
        /// Mood from 1 to 5
        #[arg(long)]
        mood: Option<u8>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List entries, newest first
    List {
        /// Maximum entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one entry
    Show {
        /// Entry ID
        id: String,
    },
    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
    },
    /// Current and longest journal streak
    Streak,
}

pub fn run(action: JournalAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let config = ctx.config()?;
    let user_id = ctx.user_id(&db)?;
    let progress = Progress::new(&db, &config);

    match action {
        JournalAction::New {
            content,
            title,
            mood,
            tags,
        } => {
            let mut entry = JournalEntry::new(&user_id, content);
            entry.title = title;
            entry.mood = mood;
            entry.tags = split_list(tags);
            let update = progress.create_journal_entry(entry, Utc::now())?;
            let events = update.award.events();
            print_json(&serde_json::json!({
                "entry": update.entry,
                "award": update.award,
                "streak": update.streak,
                "events": events,
            }))?;
        }
        JournalAction::List { limit } => {
            print_json(&db.list_journal_entries(&user_id, limit)?)?;
        }
        JournalAction::Show { id } => {
            let entry = db.require_journal_entry(&id)?;
            ensure_owner(&entry.user_id, &user_id, "journal entry", &id)?;
            print_json(&entry)?;
        }
        JournalAction::Delete { id } => {
            let entry = db.require_journal_entry(&id)?;
            ensure_owner(&entry.user_id, &user_id, "journal entry", &id)?;
            db.delete_journal_entry(&id)?;
            println!("Journal entry deleted: {id}");
        }
        JournalAction::Streak => {
            print_json(&progress.journal_streak(&user_id, Utc::now())?)?;
        }
    }
    Ok(())
}
