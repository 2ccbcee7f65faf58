//! Facility locations.

use serde::{Deserialize, Serialize};

/// A healthcare facility where patients register and samples are handled.
///
/// Locations are reference data: patients and samples point at them, never
/// the other way around. Historical records keep referencing a location
/// forever, so locations are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Row ID assigned by the store
    pub id: i64,
    /// Facility name
    pub name: String,
    /// Street address
    pub address: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}
