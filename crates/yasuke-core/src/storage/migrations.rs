//! Database schema migrations for yasuke.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;
    tracing::debug!(current_version, target = CURRENT_VERSION, "checking schema");

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(tx: &rusqlite::Transaction<'_>, version: i32) -> SqliteResult<()> {
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: profiles, the path/goal/activity hierarchy, journal, quests
/// and the XP ledger.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS profiles (
            id                TEXT PRIMARY KEY,
            email             TEXT NOT NULL,
            full_name         TEXT NOT NULL DEFAULT '',
            avatar_url        TEXT,
            level             INTEGER NOT NULL DEFAULT 1,
            xp                INTEGER NOT NULL DEFAULT 0 CHECK (xp >= 0),
            streak            INTEGER NOT NULL DEFAULT 0,
            resilience_score  INTEGER NOT NULL DEFAULT 50,
            subscription_tier TEXT NOT NULL DEFAULT 'free'
                CHECK (subscription_tier IN ('free', 'pro', 'team')),
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS paths (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            title       TEXT NOT NULL,
            description TEXT,
            color       TEXT NOT NULL DEFAULT 'yasuke-crimson',
            progress    INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS goals (
            id          TEXT PRIMARY KEY,
            path_id     TEXT NOT NULL REFERENCES paths(id) ON DELETE CASCADE,
            title       TEXT NOT NULL,
            description TEXT,
            status      TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'in_progress', 'completed', 'paused')),
            due_date    TEXT,
            virtue      TEXT,
            completed   INTEGER NOT NULL DEFAULT 0,
            xp_reward   INTEGER NOT NULL DEFAULT 50,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS activities (
            id         TEXT PRIMARY KEY,
            goal_id    TEXT NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
            note       TEXT NOT NULL,
            completed  INTEGER NOT NULL DEFAULT 0,
            xp_reward  INTEGER NOT NULL DEFAULT 25,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS journal_entries (
            id         TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            title      TEXT,
            content    TEXT NOT NULL,
            mood       INTEGER CHECK (mood >= 1 AND mood <= 5),
            tags       TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS daily_quests (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            title        TEXT NOT NULL,
            description  TEXT NOT NULL DEFAULT '',
            quest_type   TEXT NOT NULL DEFAULT 'custom'
                CHECK (quest_type IN ('meditation', 'exercise', 'reading', 'journaling', 'custom')),
            xp_reward    INTEGER NOT NULL DEFAULT 30,
            completed    INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS xp_transactions (
            id         TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            amount     INTEGER NOT NULL CHECK (amount > 0),
            source     TEXT NOT NULL
                CHECK (source IN ('quest', 'goal', 'activity', 'journal', 'streak', 'achievement')),
            source_id  TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_paths_user_id ON paths(user_id);
        CREATE INDEX IF NOT EXISTS idx_goals_path_id ON goals(path_id);
        CREATE INDEX IF NOT EXISTS idx_activities_goal_id ON activities(goal_id);
        CREATE INDEX IF NOT EXISTS idx_journal_user_created ON journal_entries(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_quests_user_id ON daily_quests(user_id);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: notifications, ledger descriptions, and the indexes used by
/// the newest-first listings.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS notifications (
            id         TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            kind       TEXT NOT NULL,
            title      TEXT NOT NULL,
            message    TEXT NOT NULL,
            data       TEXT NOT NULL DEFAULT 'null',
            read       INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user_id_created_at
            ON notifications(user_id, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_notifications_user_id_read
            ON notifications(user_id, read);
        CREATE INDEX IF NOT EXISTS idx_xp_transactions_user_id_created_at
            ON xp_transactions(user_id, created_at DESC);",
    )?;

    let has_description: bool = tx.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('xp_transactions') WHERE name = 'description'",
        [],
        |row| row.get::<_, i32>(0),
    )? > 0;
    if !has_description {
        tx.execute("ALTER TABLE xp_transactions ADD COLUMN description TEXT", [])?;
    }

    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i32>(0),
        )
        .unwrap()
            > 0
    }

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
        for table in [
            "profiles",
            "paths",
            "goals",
            "activities",
            "journal_entries",
            "daily_quests",
            "xp_transactions",
            "notifications",
            "kv",
        ] {
            assert!(table_exists(&conn, table), "missing table {table}");
        }
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_incremental_migration_adds_description() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert!(!table_exists(&conn, "notifications"));

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
        assert!(table_exists(&conn, "notifications"));

        // Column exists
        let stmt = conn
            .prepare("SELECT description FROM xp_transactions")
            .unwrap();
        drop(stmt);
    }
}
