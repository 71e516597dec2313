//! Basic CLI E2E tests.
//!
//! Each test runs the `yasuke` binary against its own temporary data
//! directory and checks the JSON it prints.

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Build a Command targeting the yasuke binary with data kept in `dir`.
fn yasuke(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("yasuke"));
    cmd.env("YASUKE_DATA_DIR", dir);
    cmd.env("YASUKE_LOG", "error");
    cmd
}

/// Run a command that must succeed and parse its stdout as JSON.
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = yasuke(dir).args(args).output().expect("yasuke should run");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn setup() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    run_json(
        dir.path(),
        &["profile", "create", "yasuke@example.com", "--id", "u1", "--name", "Yasuke"],
    );
    dir
}

#[test]
fn test_profile_create_sets_active_user() {
    let dir = setup();
    let shown = run_json(dir.path(), &["profile", "show"]);
    assert_eq!(shown["profile"]["id"], "u1");
    assert_eq!(shown["level"]["level"], 1);
}

#[test]
fn test_commands_require_active_user() {
    let dir = TempDir::new().unwrap();
    yasuke(dir.path())
        .args(["xp", "level"])
        .assert()
        .failure();
}

#[test]
fn test_xp_award_levels_up() {
    let dir = setup();
    let result = run_json(dir.path(), &["xp", "award", "150", "--source", "quest"]);
    assert_eq!(result["award"]["new_xp"], 150);
    assert_eq!(result["award"]["new_level"], 2);
    assert_eq!(result["award"]["leveled_up"], true);
    let events = result["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["type"], "LevelUp");

    let unread = yasuke(dir.path()).args(["notify", "unread"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&unread.stdout).trim(), "2");
}

#[test]
fn test_xp_award_rejects_non_positive_amount() {
    let dir = setup();
    yasuke(dir.path())
        .args(["xp", "award", "-5"])
        .assert()
        .failure();
    let history = run_json(dir.path(), &["xp", "history"]);
    assert!(history.as_array().unwrap().is_empty());
}

#[test]
fn test_level_for_arbitrary_xp() {
    let dir = TempDir::new().unwrap();
    let progress = run_json(dir.path(), &["xp", "level", "--xp", "350"]);
    assert_eq!(progress["level"], 2);
    assert_eq!(progress["percent"], 83);
}

#[test]
fn test_goal_completion_updates_path() {
    let dir = setup();
    let path = run_json(dir.path(), &["path", "create", "Discipline"]);
    let path_id = path["id"].as_str().unwrap();
    let goal = run_json(dir.path(), &["goal", "add", path_id, "Run 5k", "--virtue", "courage"]);
    let goal_id = goal["id"].as_str().unwrap();
    run_json(dir.path(), &["goal", "add", path_id, "Swim"]);

    let update = run_json(dir.path(), &["goal", "complete", goal_id]);
    assert_eq!(update["path_progress"], 50);
    assert_eq!(update["award"]["transaction"]["amount"], 50);

    let shown = run_json(dir.path(), &["path", "show", path_id]);
    assert_eq!(shown["path"]["progress"], 50);
}

#[test]
fn test_journal_entry_awards_xp() {
    let dir = setup();
    let result = run_json(
        dir.path(),
        &["journal", "new", "Trained at dawn", "--mood", "4", "--tags", "training,dawn"],
    );
    assert_eq!(result["award"]["transaction"]["amount"], 30);
    assert_eq!(result["streak"]["current"], 1);
    assert_eq!(result["entry"]["tags"].as_array().unwrap().len(), 2);

    yasuke(dir.path())
        .args(["journal", "new", "Bad mood", "--mood", "7"])
        .assert()
        .failure();
}

#[test]
fn test_quest_list_seeds_defaults() {
    let dir = setup();
    let quests = run_json(dir.path(), &["quest", "list"]);
    let quests = quests.as_array().unwrap();
    assert_eq!(quests.len(), 4);

    let id = quests[0]["id"].as_str().unwrap();
    let done = run_json(dir.path(), &["quest", "complete", id]);
    assert_eq!(done["quest"]["completed"], true);
    let streak = run_json(dir.path(), &["quest", "streak"]);
    assert_eq!(streak["current"], 1);
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();
    yasuke(dir.path())
        .args(["config", "set", "rewards.journal_entry", "45"])
        .assert()
        .success();
    let output = yasuke(dir.path())
        .args(["config", "get", "rewards.journal_entry"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "45");

    yasuke(dir.path())
        .args(["config", "set", "rewards.nope", "1"])
        .assert()
        .failure();
}

#[test]
fn test_stats_weekly_has_seven_days() {
    let dir = setup();
    run_json(dir.path(), &["xp", "award", "10"]);
    let days = run_json(dir.path(), &["stats", "weekly"]);
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 7);
    let total: i64 = days.iter().map(|d| d["xp"].as_i64().unwrap()).sum();
    assert_eq!(total, 10);

    let stats = run_json(dir.path(), &["stats", "profile"]);
    assert_eq!(stats["xp"]["total"], 10);
}

#[test]
fn test_user_override_must_exist() {
    let dir = setup();
    yasuke(dir.path())
        .args(["--user", "ghost", "profile", "show"])
        .assert()
        .failure();
}
