//! SQLite persistence and domain records for the companion.
//!
//! Named JSON records (watch list, metadata, snapshot, history, groups,
//! user settings) live in one `records` table and are always read and
//! replaced whole. Runtime configuration lives in the `settings` table.

pub mod groups;
pub mod history;
pub mod models;
pub mod records;
pub mod schema;
pub mod settings;
pub mod watch_list;

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub use groups::{Group, GroupError, Groups};
pub use history::{MAX_HISTORY, NotificationEntry, NotificationHistory};
pub use models::{
    EntityId, EntityIdError, EntityMeta, LiveSnapshot, LiveStatus, MetaMap, Platform,
    UserSettings, ViewMode,
};
pub use records::RecordKey;
pub use watch_list::{MAX_WATCH_LIST, WatchList, WatchListError};

/// Thread-safe database handle wrapping a single SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    /// Access the underlying connection with a closure.
    pub fn with_conn<F, R>(&self, f: F) -> Result<R, DbError>
    where
        F: FnOnce(&Connection) -> Result<R, DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }

    /// Access the underlying connection mutably (for transactions).
    pub fn with_conn_mut<F, R>(&self, f: F) -> Result<R, DbError>
    where
        F: FnOnce(&mut Connection) -> Result<R, DbError>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&mut conn)
    }

    fn configure(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA busy_timeout=5000;",
            )?;
            Ok(())
        })
    }

    fn migrate(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            schema::run_migrations(conn)?;
            Ok(())
        })
    }
}

/// Database error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_migrate() {
        let db = Database::open_in_memory().expect("Failed to create test DB");
        assert!(db.get_all_settings().unwrap().is_empty());
        assert!(db.record_revisions().unwrap().is_empty());
    }

    #[test]
    fn test_migrate_is_repeatable() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("API_BASE", "https://example.com/api").unwrap();
        db.migrate().unwrap();
        assert_eq!(
            db.get_setting("API_BASE").unwrap().as_deref(),
            Some("https://example.com/api")
        );
    }
}
