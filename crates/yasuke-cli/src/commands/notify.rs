//! Notification commands.

use clap::Subcommand;
use yasuke_core::{CoreError, Database};

use super::{ensure_owner, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List notifications, newest first
    List {
        /// Maximum notifications (default: notifications.history_limit from config)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Mark one notification read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark every notification read
    ReadAll,
    /// Delete a notification
    Delete {
        /// Notification ID
        id: String,
    },
    /// Count unread notifications
    Unread,
}

fn check_notification(db: &Database, user_id: &str, id: &str) -> CmdResult {
    let notification = db
        .get_notification(id)?
        .ok_or_else(|| CoreError::not_found("notification", id))?;
    ensure_owner(&notification.user_id, user_id, "notification", id)?;
    Ok(())
}

pub fn run(action: NotifyAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let user_id = ctx.user_id(&db)?;

    match action {
        NotifyAction::List { limit } => {
            let limit = match limit {
                Some(limit) => limit,
                None => ctx.config()?.notifications.history_limit as usize,
            };
            print_json(&db.list_notifications(&user_id, limit)?)?;
        }
        NotifyAction::Read { id } => {
            check_notification(&db, &user_id, &id)?;
            db.mark_notification_read(&id)?;
            println!("ok");
        }
        NotifyAction::ReadAll => {
            let marked = db.mark_all_notifications_read(&user_id)?;
            println!("Marked {marked} notifications read");
        }
        NotifyAction::Delete { id } => {
            check_notification(&db, &user_id, &id)?;
            db.delete_notification(&id)?;
            println!("Notification deleted: {id}");
        }
        NotifyAction::Unread => {
            println!("{}", db.unread_notification_count(&user_id)?);
        }
    }
    Ok(())
}
