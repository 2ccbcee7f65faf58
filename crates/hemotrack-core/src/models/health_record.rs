//! Health record models.
//!
//! Vitals appended to a patient over time. Records are append-only: patients
//! are mutated by adding records, never by editing or deleting them.

use serde::{Deserialize, Serialize};

/// Vitals captured during a visit, before persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewHealthRecord {
    /// Facility where the vitals were taken
    pub location_id: i64,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub temperature_c: Option<f64>,
    pub blood_pressure_systolic: Option<i64>,
    pub blood_pressure_diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub notes: Option<String>,
    /// Clinician who recorded the vitals
    pub recorded_by: String,
}

/// A persisted health record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthRecord {
    /// Row ID assigned by the store
    pub id: i64,
    /// Owning patient's registry identifier
    pub patient_id: String,
    pub location_id: i64,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub temperature_c: Option<f64>,
    pub blood_pressure_systolic: Option<i64>,
    pub blood_pressure_diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub notes: Option<String>,
    pub recorded_by: String,
    pub recorded_at: String,
}
