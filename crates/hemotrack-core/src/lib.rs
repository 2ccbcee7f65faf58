//! Hemotrack Core Library
//!
//! Patient registration and blood-sample lifecycle tracking across multiple
//! healthcare locations.
//!
//! # Architecture
//!
//! ```text
//! register(demographics) ──► PAT id ──► Patient
//!                                          │
//!                     collect(patient_id)  │
//!                               │          │
//!                               ▼          ▼
//!                        BS id ──► [collected] ──► record_results ──► [tested]
//!                                                       │                 │
//!                                           CAS on status            dispatch
//!                                                                         │
//!                                                    provider send ───────┤
//!                                                    + CAS on status      ▼
//!                                                                  [results_sent]
//! ```
//!
//! # Core Principles
//!
//! **Identifiers come from the store, never from memory.** The next `PAT`/
//! `BS` sequence number is derived from the maximum suffix already
//! persisted, the UNIQUE constraint arbitrates races, and losers retry.
//!
//! **State moves one way.** Every transition is a conditional update keyed
//! on the status the caller observed, so concurrent writers on the same
//! sample cannot both succeed, and a failed notification never leaves a
//! half-finished transition behind.
//!
//! # Modules
//!
//! - [`db`]: SQLite storage layer (unique inserts, conditional updates,
//!   max-suffix reads)
//! - [`models`]: Domain types (Patient, BloodSample, Location, etc.)
//! - [`ids`]: Namespaced sequential identifier generation
//! - [`registry`]: Patient registration, lookup and search
//! - [`lifecycle`]: Blood-sample state machine
//! - [`notify`]: Results notification dispatch behind a provider capability
//! - [`directory`]: Facility reference list

pub mod db;
pub mod directory;
pub mod ids;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod registry;

// Re-export commonly used types
pub use db::Database;
pub use directory::LocationDirectory;
pub use lifecycle::SampleLifecycle;
pub use models::{
    BloodSample, DashboardStats, DispatchOutcome, HealthRecord, Location, NewHealthRecord,
    NewPatient, NotificationRecord, Patient, SampleState, SampleStatus, TestOutcome,
};
pub use notify::{MessageSender, NotificationDispatcher, SendError, SimulatedSender};
pub use registry::PatientRegistry;

use std::path::Path;
use std::sync::{Arc, Mutex};

// =========================================================================
// Service Error Type
// =========================================================================

/// Errors surfaced by the core services.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input; nothing was persisted
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced location does not exist
    #[error("unknown location: {0}")]
    UnknownLocation(i64),

    /// Referenced patient does not exist
    #[error("unknown patient: {0}")]
    UnknownPatient(String),

    /// Referenced sample does not exist
    #[error("unknown sample: {0}")]
    UnknownSample(String),

    /// Attempted state change violates the one-directional lifecycle;
    /// nothing was persisted
    #[error("invalid transition: sample {sample_id} is {current} and cannot accept {operation}")]
    InvalidTransition {
        sample_id: String,
        current: models::SampleStatus,
        operation: &'static str,
    },

    /// Fatal storage failure, including exhausted identifier-allocation
    /// retries
    #[error("storage error: {0}")]
    Storage(#[from] db::DbError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        CoreError::Internal(format!("lock poisoned: {e}"))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe handle shared by request handlers.
///
/// Serializes store access in-process; correctness under concurrent or
/// multi-process deployment still rests on the storage layer's constraints
/// and conditional updates, not on this lock.
#[derive(Clone)]
pub struct HemotrackCore {
    db: Arc<Mutex<Database>>,
}

impl HemotrackCore {
    /// Open or create the tracking database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let db = Database::open(path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Create an in-memory instance (for testing).
    pub fn open_in_memory() -> CoreResult<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    // =========================================================================
    // Location Operations
    // =========================================================================

    /// Add a facility.
    pub fn add_location(
        &self,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> CoreResult<Location> {
        let db = self.db.lock()?;
        LocationDirectory::new(&db).add(name, address, phone)
    }

    /// Resolve a location by ID.
    pub fn get_location(&self, id: i64) -> CoreResult<Location> {
        let db = self.db.lock()?;
        LocationDirectory::new(&db).get(id)
    }

    /// All facilities.
    pub fn list_locations(&self) -> CoreResult<Vec<Location>> {
        let db = self.db.lock()?;
        LocationDirectory::new(&db).list()
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient at a location.
    pub fn register_patient(
        &self,
        demographics: NewPatient,
        location_id: i64,
    ) -> CoreResult<Patient> {
        let db = self.db.lock()?;
        PatientRegistry::new(&db).register(demographics, location_id)
    }

    /// Resolve a patient by registry identifier, from any location.
    pub fn get_patient(&self, patient_id: &str) -> CoreResult<Patient> {
        let db = self.db.lock()?;
        PatientRegistry::new(&db).lookup(patient_id)
    }

    /// Search patients by identifier prefix or name substring.
    pub fn search_patients(&self, query: &str, limit: usize) -> CoreResult<Vec<Patient>> {
        let db = self.db.lock()?;
        PatientRegistry::new(&db).search(query, limit)
    }

    /// Append a health record to a patient.
    pub fn add_health_record(
        &self,
        patient_id: &str,
        record: NewHealthRecord,
    ) -> CoreResult<HealthRecord> {
        let db = self.db.lock()?;
        PatientRegistry::new(&db).add_health_record(patient_id, record)
    }

    /// A patient's health records, newest first.
    pub fn health_records(&self, patient_id: &str) -> CoreResult<Vec<HealthRecord>> {
        let db = self.db.lock()?;
        PatientRegistry::new(&db).health_records(patient_id)
    }

    // =========================================================================
    // Sample Operations
    // =========================================================================

    /// Record a newly drawn sample for an existing patient.
    pub fn collect_sample(
        &self,
        patient_id: &str,
        collection_location_id: i64,
        test_type: &str,
        collector_name: &str,
    ) -> CoreResult<BloodSample> {
        let db = self.db.lock()?;
        SampleLifecycle::new(&db).collect(
            patient_id,
            collection_location_id,
            test_type,
            collector_name,
        )
    }

    /// Enter test results, advancing the sample to `tested`.
    pub fn record_test_results(
        &self,
        sample_id: &str,
        test_location_id: i64,
        technician_name: &str,
        results: &str,
    ) -> CoreResult<BloodSample> {
        let db = self.db.lock()?;
        SampleLifecycle::new(&db).record_results(
            sample_id,
            test_location_id,
            technician_name,
            results,
        )
    }

    /// Resolve a sample by identifier.
    pub fn get_sample(&self, sample_id: &str) -> CoreResult<BloodSample> {
        let db = self.db.lock()?;
        SampleLifecycle::new(&db).get_sample(sample_id)
    }

    /// Current lifecycle status of a sample.
    pub fn sample_status(&self, sample_id: &str) -> CoreResult<SampleStatus> {
        let db = self.db.lock()?;
        SampleLifecycle::new(&db).get_status(sample_id)
    }

    /// Worklist of samples in a status, oldest collection first.
    pub fn samples_by_status(&self, status: SampleStatus) -> CoreResult<Vec<BloodSample>> {
        let db = self.db.lock()?;
        SampleLifecycle::new(&db).list_by_status(status)
    }

    /// All samples for a patient, newest collection first.
    pub fn samples_for_patient(&self, patient_id: &str) -> CoreResult<Vec<BloodSample>> {
        let db = self.db.lock()?;
        SampleLifecycle::new(&db).list_for_patient(patient_id)
    }

    // =========================================================================
    // Notification Operations
    // =========================================================================

    /// Send the results for a tested sample through the given provider.
    pub fn dispatch_results(
        &self,
        sample_id: &str,
        sender: &dyn MessageSender,
    ) -> CoreResult<DispatchOutcome> {
        let db = self.db.lock()?;
        NotificationDispatcher::new(&db, sender).dispatch(sample_id)
    }

    /// Dispatch history for a sample, oldest attempt first.
    pub fn notification_history(&self, sample_id: &str) -> CoreResult<Vec<NotificationRecord>> {
        let db = self.db.lock()?;
        if db.get_sample(sample_id)?.is_none() {
            return Err(CoreError::UnknownSample(sample_id.to_string()));
        }
        Ok(db.list_notifications(sample_id)?)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Counters for the front page.
    pub fn dashboard_stats(&self) -> CoreResult<DashboardStats> {
        let db = self.db.lock()?;
        Ok(DashboardStats {
            total_patients: db.count_patients()?,
            total_locations: db.count_locations()?,
            samples_pending_testing: db.count_samples_with_status(SampleStatus::Collected)?,
            samples_awaiting_dispatch: db.count_samples_with_status(SampleStatus::Tested)?,
        })
    }
}
