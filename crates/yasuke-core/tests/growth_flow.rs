//! Integration tests for the XP flows across paths, goals, activities,
//! journal entries and quests.
//!
//! Everything runs against an on-disk database in a temp dir so reopening
//! exercises the stored snapshot as well as the ledger.

use chrono::Utc;
use tempfile::TempDir;
use yasuke_core::{
    level_for_xp, Activity, Config, Database, Goal, GoalStatus, JournalEntry, Path, Profile,
    Progress, XpHistoryFilter, XpSource,
};

fn open(dir: &TempDir) -> Database {
    Database::open_at(dir.path().join("yasuke.db")).unwrap()
}

fn setup() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.create_profile(&Profile::new("u1", "yasuke@example.com", "Yasuke"))
        .unwrap();
    (dir, db)
}

#[test]
fn test_full_path_walkthrough() {
    let (_dir, db) = setup();
    let config = Config::default();
    let progress = Progress::new(&db, &config);

    let path = Path::new("u1", "Way of the Sword");
    db.create_path(&path).unwrap();

    let mut goal = Goal::new(&path.id, "Master the basic cuts");
    goal.xp_reward = 120;
    goal.virtue = Some("courage".to_string());
    progress.add_goal(&goal).unwrap();
    let other = Goal::new(&path.id, "Study the scrolls");
    progress.add_goal(&other).unwrap();

    let mut step = Activity::new(&goal.id, "Practice kesa-giri");
    step.xp_reward = 20;
    db.create_activity(&step).unwrap();

    let activity = progress.complete_activity(&step.id).unwrap();
    assert!(activity.all_activities_completed);
    assert!(!activity.goal_completed);
    assert_eq!(activity.award.as_ref().unwrap().new_xp, 20);

    let update = progress.complete_goal(&goal.id).unwrap();
    assert_eq!(update.path_progress, 50);
    let award = update.award.unwrap();
    assert_eq!(award.new_xp, 140);
    assert_eq!(award.new_level, 2);
    assert!(award.leveled_up);

    let profile = db.require_profile("u1").unwrap();
    assert_eq!(profile.xp, 140);
    assert_eq!(profile.level, level_for_xp(140));
    assert_eq!(db.require_path(&path.id).unwrap().progress, 50);
}

#[test]
fn test_status_changes_do_not_double_award() {
    let (_dir, db) = setup();
    let config = Config::default();
    let progress = Progress::new(&db, &config);

    let path = Path::new("u1", "Discipline");
    db.create_path(&path).unwrap();
    let goal = Goal::new(&path.id, "Wake at five");
    progress.add_goal(&goal).unwrap();

    progress.complete_goal(&goal.id).unwrap();
    let again = progress
        .set_goal_status(&goal.id, GoalStatus::Completed)
        .unwrap();
    assert!(again.award.is_none());

    progress.reopen_goal(&goal.id).unwrap();
    assert_eq!(db.require_path(&path.id).unwrap().progress, 0);
    let xp_after_reopen = db.require_profile("u1").unwrap().xp;
    assert_eq!(xp_after_reopen, goal.xp_reward as u64);

    let filter = XpHistoryFilter {
        source: Some(XpSource::Goal),
        ..Default::default()
    };
    assert_eq!(db.xp_history("u1", &filter).unwrap().len(), 1);
}

#[test]
fn test_snapshot_survives_reopen_and_matches_ledger() {
    let (dir, db) = setup();
    let config = Config::default();
    let progress = Progress::new(&db, &config);

    progress
        .create_journal_entry(JournalEntry::new("u1", "First light"), Utc::now())
        .unwrap();
    progress
        .create_journal_entry(JournalEntry::new("u1", "Evening kata"), Utc::now())
        .unwrap();
    drop(progress);
    drop(db);

    let db = open(&dir);
    let profile = db.require_profile("u1").unwrap();
    let expected = 2 * config.rewards.journal_entry as u64;
    assert_eq!(profile.xp, expected);
    assert_eq!(db.ledger_total("u1").unwrap(), expected);
    assert_eq!(profile.streak, 1);

    let repaired = db.recompute_progress("u1").unwrap();
    assert_eq!(repaired.xp, expected);
    assert!(repaired.is_consistent());
}

#[test]
fn test_profile_stats_reflect_activity() {
    let (_dir, db) = setup();
    let config = Config::default();
    let progress = Progress::new(&db, &config);

    let path = Path::new("u1", "Honor");
    db.create_path(&path).unwrap();
    let goal = Goal::new(&path.id, "Keep every promise");
    progress.add_goal(&goal).unwrap();
    progress.complete_goal(&goal.id).unwrap();

    let mut entry = JournalEntry::new("u1", "Kept my word");
    entry.mood = Some(4);
    progress.create_journal_entry(entry, Utc::now()).unwrap();

    let stats = db.profile_stats("u1", &config, Utc::now()).unwrap();
    assert_eq!(stats.paths.total, 1);
    assert_eq!(stats.paths.completed, 1);
    assert_eq!(stats.goals.completed, 1);
    assert_eq!(stats.journal.total_entries, 1);
    assert_eq!(stats.journal.current_streak, 1);
    assert_eq!(stats.xp.from_goals, goal.xp_reward);
    assert_eq!(stats.xp.from_journal, config.rewards.journal_entry);
    assert_eq!(stats.xp.this_week, stats.xp.total);

    let week = db.weekly_activity("u1", &config, Utc::now()).unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week.iter().map(|d| d.activities).sum::<usize>(), 2);
}

#[test]
fn test_deleting_path_removes_its_goals() {
    let (_dir, db) = setup();
    let config = Config::default();
    let progress = Progress::new(&db, &config);

    let path = Path::new("u1", "Loyalty");
    db.create_path(&path).unwrap();
    let goal = Goal::new(&path.id, "Call home weekly");
    progress.add_goal(&goal).unwrap();
    db.create_activity(&Activity::new(&goal.id, "Sunday call"))
        .unwrap();

    db.delete_path(&path.id).unwrap();
    assert!(db.get_goal(&goal.id).unwrap().is_none());
    assert!(db.list_user_goals("u1").unwrap().is_empty());
}
