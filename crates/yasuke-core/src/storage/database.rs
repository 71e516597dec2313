//! SQLite-backed storage.
//!
//! One [`Database`] owns one connection. Callers construct it once and pass
//! it by reference to whatever needs storage; there is no shared global
//! client. Entity-specific queries live in sibling modules as further
//! `impl Database` blocks.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::leveling::level_for_xp;
use crate::profile::{Profile, SubscriptionTier};

const ACTIVE_USER_KEY: &str = "active_user";

/// Fixed-width UTC form so stored timestamps sort lexically.
pub(crate) fn format_ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored RFC 3339 timestamp, reporting failures as a column
/// conversion error.
pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

/// Map a stored enum string through a fallible parser.
pub(crate) fn parse_col<T, E>(idx: usize, raw: &str, parse: impl Fn(&str) -> Result<T, E>) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    parse(raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn to_u64(idx: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

pub(crate) fn to_u32(idx: usize, value: i64) -> rusqlite::Result<u32> {
    u32::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

pub(crate) const PROFILE_COLUMNS: &str = "id, email, full_name, avatar_url, level, xp, streak,
     resilience_score, subscription_tier, created_at, updated_at";

pub(crate) fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
    let tier: String = row.get(8)?;
    Ok(Profile {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        avatar_url: row.get(3)?,
        level: to_u32(4, row.get(4)?)?,
        xp: to_u64(5, row.get(5)?)?,
        streak: to_u32(6, row.get(6)?)?,
        resilience_score: row.get(7)?,
        subscription_tier: parse_col(8, &tier, SubscriptionTier::parse)?,
        created_at: parse_ts(9, &row.get::<_, String>(9)?)?,
        updated_at: parse_ts(10, &row.get::<_, String>(10)?)?,
    })
}

/// SQLite database for all Path of Yasuke data.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/yasuke.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("yasuke.db"))
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Run `f` in a transaction. When the caller already opened one, `f`
    /// joins it and the caller decides whether to commit.
    pub(crate) fn in_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        if !self.conn.is_autocommit() {
            return f(&self.conn);
        }
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// The user subsequent commands act on, if one was selected.
    pub fn active_user(&self) -> Result<Option<String>> {
        self.kv_get(ACTIVE_USER_KEY)
    }

    /// Select the user subsequent commands act on.
    ///
    /// # Errors
    /// Returns `NotFound` if no such profile exists.
    pub fn set_active_user(&self, user_id: &str) -> Result<()> {
        self.require_profile(user_id)?;
        self.kv_set(ACTIVE_USER_KEY, user_id)
    }

    // === Profiles ===

    pub fn create_profile(&self, profile: &Profile) -> Result<()> {
        if profile.id.trim().is_empty() {
            return Err(ValidationError::invalid("id", "must not be empty").into());
        }
        let xp = i64::try_from(profile.xp)
            .map_err(|_| ValidationError::invalid("xp", "exceeds the storable range"))?;
        self.conn.execute(
            "INSERT INTO profiles (id, email, full_name, avatar_url, level, xp, streak,
                                   resilience_score, subscription_tier, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                profile.id,
                profile.email,
                profile.full_name,
                profile.avatar_url,
                // level is always derived, whatever the caller put in the struct
                i64::from(level_for_xp(profile.xp)),
                xp,
                i64::from(profile.streak),
                profile.resilience_score,
                profile.subscription_tier.as_str(),
                format_ts(&profile.created_at),
                format_ts(&profile.updated_at),
            ],
        )?;
        tracing::info!(user_id = %profile.id, "profile created");
        Ok(())
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![user_id], row_to_profile)
            .optional()?)
    }

    /// Like [`get_profile`](Self::get_profile) but a missing profile is an error.
    pub fn require_profile(&self, user_id: &str) -> Result<Profile> {
        self.get_profile(user_id)?
            .ok_or_else(|| CoreError::not_found("profile", user_id))
    }

    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at");
        let mut stmt = self.conn.prepare(&sql)?;
        let profiles = stmt
            .query_map([], row_to_profile)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(profiles)
    }

    /// Persist the cached journal streak on the profile.
    pub fn set_profile_streak(&self, user_id: &str, streak: u32) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE profiles SET streak = ?1, updated_at = ?2 WHERE id = ?3",
            params![i64::from(streak), format_ts(&Utc::now()), user_id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("profile", user_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn profile_round_trip() {
        let db = Database::open_memory().unwrap();
        let profile = Profile::new("u1", "yasuke@example.com", "Yasuke");
        db.create_profile(&profile).unwrap();

        let loaded = db.require_profile("u1").unwrap();
        assert_eq!(loaded.email, "yasuke@example.com");
        assert_eq!(loaded.level, 1);
        assert_eq!(loaded.created_at, profile.created_at);
        assert_eq!(db.list_profiles().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_profile_is_an_error() {
        let db = Database::open_memory().unwrap();
        let profile = Profile::new("u1", "a@b.c", "A");
        db.create_profile(&profile).unwrap();
        assert!(db.create_profile(&profile).is_err());
    }

    #[test]
    fn active_user_requires_existing_profile() {
        let db = Database::open_memory().unwrap();
        assert!(db.set_active_user("ghost").is_err());
        db.create_profile(&Profile::new("u1", "a@b.c", "A")).unwrap();
        db.set_active_user("u1").unwrap();
        assert_eq!(db.active_user().unwrap().as_deref(), Some("u1"));
    }

    #[test]
    fn missing_profile_is_not_found() {
        let db = Database::open_memory().unwrap();
        assert!(db.get_profile("nope").unwrap().is_none());
        assert!(matches!(
            db.require_profile("nope"),
            Err(CoreError::NotFound { .. })
        ));
        assert!(db.set_profile_streak("nope", 3).is_err());
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yasuke.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v"));
    }
}
