//! Patient models.

use serde::{Deserialize, Serialize};

/// Demographics supplied at registration, before an identifier is assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    /// Display name
    pub name: String,
    /// ISO-8601 calendar date (`YYYY-MM-DD`)
    pub date_of_birth: String,
    pub gender: String,
    /// Contact number, also the recipient for results notifications
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Registry identifier (`PAT` + 6-digit sequence), immutable and
    /// globally unique
    pub patient_id: String,
    pub name: String,
    /// ISO-8601 calendar date
    pub date_of_birth: String,
    pub gender: String,
    /// Contact number used for results notification
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    /// Facility where the patient first registered; lookups are
    /// location-independent
    pub registration_location_id: i64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Build a patient record from validated demographics and a freshly
    /// allocated identifier.
    pub fn from_new(patient_id: String, demographics: NewPatient, location_id: i64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            patient_id,
            name: demographics.name,
            date_of_birth: demographics.date_of_birth,
            gender: demographics.gender,
            phone: demographics.phone,
            email: demographics.email,
            address: demographics.address,
            emergency_contact: demographics.emergency_contact,
            registration_location_id: location_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
