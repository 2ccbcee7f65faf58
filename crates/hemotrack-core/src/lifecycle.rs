//! Blood sample lifecycle management.
//!
//! Samples move `collected` -> `tested` -> `results_sent`, one way only.
//! Every transition is written as a conditional update keyed on the status
//! the caller observed, so two writers racing on the same sample cannot both
//! succeed; different samples proceed fully in parallel.

use crate::db::{Database, DbError};
use crate::ids::{self, Namespace};
use crate::models::{BloodSample, SampleStatus, TestOutcome};
use crate::{CoreError, CoreResult};

/// Creates samples and drives their state machine.
pub struct SampleLifecycle<'a> {
    db: &'a Database,
}

impl<'a> SampleLifecycle<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record a newly drawn sample for an existing patient.
    ///
    /// The owning patient must resolve through the registry; the sample is
    /// persisted in the initial `collected` state with a fresh `BS`
    /// identifier (same bounded retry as patient registration).
    pub fn collect(
        &self,
        patient_id: &str,
        collection_location_id: i64,
        test_type: &str,
        collector_name: &str,
    ) -> CoreResult<BloodSample> {
        if test_type.trim().is_empty() {
            return Err(CoreError::Validation("test_type is required".into()));
        }
        if collector_name.trim().is_empty() {
            return Err(CoreError::Validation("collector_name is required".into()));
        }
        let patient = self
            .db
            .get_patient(patient_id)?
            .ok_or_else(|| CoreError::UnknownPatient(patient_id.to_string()))?;
        if !self.db.location_exists(collection_location_id)? {
            return Err(CoreError::UnknownLocation(collection_location_id));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let sequence = ids::next_sequence(self.db, Namespace::Sample)?;
            let sample = BloodSample::collected(
                ids::format_id(Namespace::Sample, sequence),
                patient.patient_id.clone(),
                collection_location_id,
                test_type.trim().to_string(),
                collector_name.trim().to_string(),
            );
            match self.db.insert_sample(&sample) {
                Ok(()) => {
                    tracing::info!(
                        "collected sample {} for patient {} ({})",
                        sample.sample_id,
                        sample.patient_id,
                        sample.test_type
                    );
                    return Ok(sample);
                }
                Err(DbError::DuplicateId(id)) if attempt < ids::MAX_ID_RETRIES => {
                    tracing::warn!("sample identifier {} already taken, retrying", id);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Enter test results, advancing the sample from `collected` to
    /// `tested`.
    ///
    /// Results are entered exactly once per sample: any state other than
    /// `collected` is refused with `InvalidTransition`, including a repeat
    /// call on an already tested sample.
    pub fn record_results(
        &self,
        sample_id: &str,
        test_location_id: i64,
        technician_name: &str,
        results: &str,
    ) -> CoreResult<BloodSample> {
        if technician_name.trim().is_empty() {
            return Err(CoreError::Validation("technician_name is required".into()));
        }
        if results.trim().is_empty() {
            return Err(CoreError::Validation("results are required".into()));
        }
        let sample = self.get_sample(sample_id)?;
        if !self.db.location_exists(test_location_id)? {
            return Err(CoreError::UnknownLocation(test_location_id));
        }
        if sample.status() != SampleStatus::Collected {
            return Err(CoreError::InvalidTransition {
                sample_id: sample.sample_id.clone(),
                current: sample.status(),
                operation: "record_results",
            });
        }

        let outcome = TestOutcome {
            results: results.to_string(),
            test_location_id,
            technician_name: technician_name.trim().to_string(),
            tested_at: chrono::Utc::now().to_rfc3339(),
        };
        if !self.db.mark_tested(sample_id, &outcome)? {
            // lost the conditional update to a concurrent writer; report
            // the status that beat us
            let current = self.get_sample(sample_id)?.status();
            return Err(CoreError::InvalidTransition {
                sample_id: sample_id.to_string(),
                current,
                operation: "record_results",
            });
        }

        tracing::info!("sample {} tested at location {}", sample_id, test_location_id);
        self.get_sample(sample_id)
    }

    /// Resolve a sample by identifier.
    pub fn get_sample(&self, sample_id: &str) -> CoreResult<BloodSample> {
        self.db
            .get_sample(sample_id)?
            .ok_or_else(|| CoreError::UnknownSample(sample_id.to_string()))
    }

    /// Current lifecycle status of a sample.
    pub fn get_status(&self, sample_id: &str) -> CoreResult<SampleStatus> {
        Ok(self.get_sample(sample_id)?.status())
    }

    /// Worklist of samples in a status, oldest collection first.
    pub fn list_by_status(&self, status: SampleStatus) -> CoreResult<Vec<BloodSample>> {
        Ok(self.db.list_samples_by_status(status)?)
    }

    /// All samples for a patient, newest collection first.
    pub fn list_for_patient(&self, patient_id: &str) -> CoreResult<Vec<BloodSample>> {
        Ok(self.db.list_samples_for_patient(patient_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPatient;
    use crate::registry::PatientRegistry;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        let registry = PatientRegistry::new(&db);
        registry
            .register(
                NewPatient {
                    name: "Jane Doe".into(),
                    date_of_birth: "1990-01-01".into(),
                    gender: "F".into(),
                    phone: "555-0100".into(),
                    email: None,
                    address: None,
                    emergency_contact: None,
                },
                1,
            )
            .unwrap();
        db
    }

    #[test]
    fn test_collect_first_sample() {
        let db = setup_db();
        let lifecycle = SampleLifecycle::new(&db);

        let sample = lifecycle
            .collect("PAT000001", 1, "CBC", "Nurse Kim")
            .unwrap();
        assert_eq!(sample.sample_id, "BS000001");
        assert_eq!(sample.status(), SampleStatus::Collected);
    }

    #[test]
    fn test_collect_unknown_patient_creates_nothing() {
        let db = setup_db();
        let lifecycle = SampleLifecycle::new(&db);

        let err = lifecycle
            .collect("PAT999999", 1, "CBC", "Nurse Kim")
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownPatient(_)));
        assert_eq!(
            db.count_samples_with_status(SampleStatus::Collected).unwrap(),
            0
        );
    }

    #[test]
    fn test_collect_unknown_location() {
        let db = setup_db();
        let lifecycle = SampleLifecycle::new(&db);

        let err = lifecycle
            .collect("PAT000001", 42, "CBC", "Nurse Kim")
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownLocation(42)));
    }

    #[test]
    fn test_record_results_advances_to_tested() {
        let db = setup_db();
        let lifecycle = SampleLifecycle::new(&db);

        lifecycle.collect("PAT000001", 1, "CBC", "Nurse Kim").unwrap();
        let sample = lifecycle
            .record_results("BS000001", 1, "Sam Lee", "WBC 6.2, RBC 4.7")
            .unwrap();

        assert_eq!(sample.status(), SampleStatus::Tested);
        let outcome = sample.state.test_outcome().unwrap();
        assert_eq!(outcome.results, "WBC 6.2, RBC 4.7");
        assert_eq!(outcome.technician_name, "Sam Lee");
    }

    #[test]
    fn test_record_results_is_not_idempotent() {
        let db = setup_db();
        let lifecycle = SampleLifecycle::new(&db);

        lifecycle.collect("PAT000001", 1, "CBC", "Nurse Kim").unwrap();
        lifecycle
            .record_results("BS000001", 1, "Sam Lee", "WBC 6.2")
            .unwrap();

        let err = lifecycle
            .record_results("BS000001", 1, "Sam Lee", "WBC 9.9")
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                current: SampleStatus::Tested,
                ..
            }
        ));

        // stored fields unchanged by the refused call
        let sample = lifecycle.get_sample("BS000001").unwrap();
        assert_eq!(sample.state.test_outcome().unwrap().results, "WBC 6.2");
    }

    #[test]
    fn test_record_results_unknown_sample() {
        let db = setup_db();
        let lifecycle = SampleLifecycle::new(&db);

        let err = lifecycle
            .record_results("BS999999", 1, "Sam Lee", "WBC 6.2")
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownSample(_)));
    }

    #[test]
    fn test_status_and_worklist() {
        let db = setup_db();
        let lifecycle = SampleLifecycle::new(&db);

        lifecycle.collect("PAT000001", 1, "CBC", "Nurse Kim").unwrap();
        lifecycle.collect("PAT000001", 1, "Lipid", "Nurse Kim").unwrap();
        lifecycle
            .record_results("BS000001", 1, "Sam Lee", "WBC 6.2")
            .unwrap();

        assert_eq!(
            lifecycle.get_status("BS000001").unwrap(),
            SampleStatus::Tested
        );
        assert_eq!(
            lifecycle.get_status("BS000002").unwrap(),
            SampleStatus::Collected
        );

        let awaiting_results = lifecycle.list_by_status(SampleStatus::Collected).unwrap();
        assert_eq!(awaiting_results.len(), 1);
        assert_eq!(awaiting_results[0].sample_id, "BS000002");

        let for_patient = lifecycle.list_for_patient("PAT000001").unwrap();
        assert_eq!(for_patient.len(), 2);
    }
}
