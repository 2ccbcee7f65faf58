//! Location directory.

use crate::db::Database;
use crate::models::Location;
use crate::{CoreError, CoreResult};

/// Reference list of facilities. Other components tag records with these
/// IDs; the directory itself carries no lifecycle logic. Locations are never
/// deleted because historical patients and samples keep referencing them,
/// and a default facility is seeded so the first registration always has a
/// place to happen.
pub struct LocationDirectory<'a> {
    db: &'a Database,
}

impl<'a> LocationDirectory<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a facility.
    pub fn add(
        &self,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> CoreResult<Location> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("location name is required".into()));
        }
        let location = self.db.insert_location(name, address, phone)?;
        tracing::info!("added location {} ({})", location.id, location.name);
        Ok(location)
    }

    /// Resolve a location by ID.
    pub fn get(&self, id: i64) -> CoreResult<Location> {
        self.db
            .get_location(id)?
            .ok_or(CoreError::UnknownLocation(id))
    }

    /// All facilities, oldest first.
    pub fn list(&self) -> CoreResult<Vec<Location>> {
        Ok(self.db.list_locations()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_default_location_exists_at_first_use() {
        let db = setup_db();
        let directory = LocationDirectory::new(&db);

        let locations = directory.list().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Main Hospital");
    }

    #[test]
    fn test_add_and_get() {
        let db = setup_db();
        let directory = LocationDirectory::new(&db);

        let added = directory
            .add("Westside Lab", None, Some("+1555000111"))
            .unwrap();
        let fetched = directory.get(added.id).unwrap();
        assert_eq!(fetched.name, "Westside Lab");
        assert_eq!(fetched.phone, Some("+1555000111".into()));
    }

    #[test]
    fn test_empty_name_rejected() {
        let db = setup_db();
        let directory = LocationDirectory::new(&db);

        let err = directory.add("   ", None, None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_unknown_location() {
        let db = setup_db();
        let directory = LocationDirectory::new(&db);

        let err = directory.get(999).unwrap_err();
        assert!(matches!(err, CoreError::UnknownLocation(999)));
    }
}
