//! Database layer for hemotrack.
//!
//! Thin wrapper over SQLite providing exactly the primitives the services
//! above it need: UNIQUE-constrained inserts that fail distinguishably on a
//! duplicate identifier, conditional status updates (compare-and-swap on the
//! current status), and per-namespace maximum-suffix reads.

mod schema;
mod locations;
mod patients;
mod health_records;
mod samples;
mod notifications;
mod sequence;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// True when the error is a primary-key/unique collision, i.e. another
/// writer inserted the same identifier first.
pub(crate) fn is_duplicate_id(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"locations".to_string()));
        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"health_records".to_string()));
        assert!(tables.contains(&"blood_samples".to_string()));
        assert!(tables.contains(&"notifications".to_string()));
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hemotrack.db");

        {
            let _db = Database::open(&path).unwrap();
        }
        let db = Database::open(&path).unwrap();

        // Seeded default location must not be duplicated by the second open
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
