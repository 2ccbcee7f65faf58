//! Location database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::Location;

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Database {
    /// Insert a new location and return it with its assigned row ID.
    pub fn insert_location(
        &self,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> DbResult<Location> {
        self.conn.execute(
            "INSERT INTO locations (name, address, phone) VALUES (?1, ?2, ?3)",
            params![name, address, phone],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_location(id)?
            .ok_or_else(|| DbError::NotFound(format!("location {id}")))
    }

    /// Get a location by ID.
    pub fn get_location(&self, id: i64) -> DbResult<Option<Location>> {
        self.conn
            .query_row(
                "SELECT id, name, address, phone, created_at FROM locations WHERE id = ?",
                [id],
                location_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Check that a location exists (for foreign-key validation up front).
    pub fn location_exists(&self, id: i64) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM locations WHERE id = ?",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List all locations, oldest first.
    pub fn list_locations(&self) -> DbResult<Vec<Location>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, address, phone, created_at FROM locations ORDER BY id")?;
        let rows = stmt.query_map([], location_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Total number of locations.
    pub fn count_locations(&self) -> DbResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
