//! Patient registry.
//!
//! Issues registry identifiers and owns patient reads. Lookups resolve any
//! patient from any location; the registration location is just a tag on the
//! record.

use crate::db::{Database, DbError};
use crate::ids::{self, Namespace};
use crate::models::{HealthRecord, NewHealthRecord, NewPatient, Patient};
use crate::{CoreError, CoreResult};

/// Patient registration and lookup.
pub struct PatientRegistry<'a> {
    db: &'a Database,
}

impl<'a> PatientRegistry<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Register a new patient at a location.
    ///
    /// Allocates the next `PAT` identifier from the store; when the insert
    /// loses an allocation race the identifier is recomputed and the insert
    /// retried a bounded number of times before surfacing a storage error.
    pub fn register(&self, demographics: NewPatient, location_id: i64) -> CoreResult<Patient> {
        validate_demographics(&demographics)?;
        if !self.db.location_exists(location_id)? {
            return Err(CoreError::UnknownLocation(location_id));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let sequence = ids::next_sequence(self.db, Namespace::Patient)?;
            let patient = Patient::from_new(
                ids::format_id(Namespace::Patient, sequence),
                demographics.clone(),
                location_id,
            );
            match self.db.insert_patient(&patient) {
                Ok(()) => {
                    tracing::info!(
                        "registered patient {} at location {}",
                        patient.patient_id,
                        location_id
                    );
                    return Ok(patient);
                }
                Err(DbError::DuplicateId(id)) if attempt < ids::MAX_ID_RETRIES => {
                    tracing::warn!("patient identifier {} already taken, retrying", id);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolve a patient by registry identifier, from any location.
    pub fn lookup(&self, patient_id: &str) -> CoreResult<Patient> {
        self.db
            .get_patient(patient_id)?
            .ok_or_else(|| CoreError::UnknownPatient(patient_id.to_string()))
    }

    /// Search by identifier prefix or name substring; results are ordered
    /// by patient_id ascending so repeated searches are reproducible.
    pub fn search(&self, query: &str, limit: usize) -> CoreResult<Vec<Patient>> {
        Ok(self.db.search_patients(query, limit)?)
    }

    /// Append a health record to an existing patient.
    pub fn add_health_record(
        &self,
        patient_id: &str,
        record: NewHealthRecord,
    ) -> CoreResult<HealthRecord> {
        if record.recorded_by.trim().is_empty() {
            return Err(CoreError::Validation("recorded_by is required".into()));
        }
        self.lookup(patient_id)?;
        if !self.db.location_exists(record.location_id)? {
            return Err(CoreError::UnknownLocation(record.location_id));
        }
        let record = self.db.insert_health_record(patient_id, &record)?;
        tracing::info!("added health record {} for patient {}", record.id, patient_id);
        Ok(record)
    }

    /// A patient's health records, newest first.
    pub fn health_records(&self, patient_id: &str) -> CoreResult<Vec<HealthRecord>> {
        self.lookup(patient_id)?;
        Ok(self.db.list_health_records(patient_id)?)
    }
}

fn validate_demographics(demographics: &NewPatient) -> CoreResult<()> {
    if demographics.name.trim().is_empty() {
        return Err(CoreError::Validation("name is required".into()));
    }
    if demographics.gender.trim().is_empty() {
        return Err(CoreError::Validation("gender is required".into()));
    }
    if demographics.phone.trim().is_empty() {
        return Err(CoreError::Validation("phone is required".into()));
    }
    if chrono::NaiveDate::parse_from_str(&demographics.date_of_birth, "%Y-%m-%d").is_err() {
        return Err(CoreError::Validation(format!(
            "date_of_birth must be a YYYY-MM-DD date, got {:?}",
            demographics.date_of_birth
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn jane() -> NewPatient {
        NewPatient {
            name: "Jane Doe".into(),
            date_of_birth: "1990-01-01".into(),
            gender: "F".into(),
            phone: "555-0100".into(),
            email: None,
            address: None,
            emergency_contact: None,
        }
    }

    #[test]
    fn test_first_registration_gets_pat000001() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        let patient = registry.register(jane(), 1).unwrap();
        assert_eq!(patient.patient_id, "PAT000001");
    }

    #[test]
    fn test_sequential_identifiers() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        for i in 1..=5 {
            let patient = registry.register(jane(), 1).unwrap();
            assert_eq!(patient.patient_id, format!("PAT{:06}", i));
        }
    }

    #[test]
    fn test_validation_errors() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        let mut missing_name = jane();
        missing_name.name = "  ".into();
        assert!(matches!(
            registry.register(missing_name, 1),
            Err(CoreError::Validation(_))
        ));

        let mut bad_dob = jane();
        bad_dob.date_of_birth = "01/01/1990".into();
        assert!(matches!(
            registry.register(bad_dob, 1),
            Err(CoreError::Validation(_))
        ));

        // nothing persisted
        assert_eq!(db.count_patients().unwrap(), 0);
    }

    #[test]
    fn test_unknown_location() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        let err = registry.register(jane(), 42).unwrap_err();
        assert!(matches!(err, CoreError::UnknownLocation(42)));
        assert_eq!(db.count_patients().unwrap(), 0);
    }

    #[test]
    fn test_lookup_from_any_location() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        let registered = registry.register(jane(), 1).unwrap();
        // lookup takes no location: any client can resolve any patient
        let found = registry.lookup(&registered.patient_id).unwrap();
        assert_eq!(found, registered);
    }

    #[test]
    fn test_lookup_unknown_patient() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        let err = registry.lookup("PAT999999").unwrap_err();
        assert!(matches!(err, CoreError::UnknownPatient(id) if id == "PAT999999"));
    }

    #[test]
    fn test_search_matches_id_and_name() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        registry.register(jane(), 1).unwrap();
        let mut john = jane();
        john.name = "John Roe".into();
        registry.register(john, 1).unwrap();

        assert_eq!(registry.search("PAT", 10).unwrap().len(), 2);
        assert_eq!(registry.search("Jane", 10).unwrap().len(), 1);
        assert!(registry.search("Nobody", 10).unwrap().is_empty());
    }

    #[test]
    fn test_health_record_roundtrip() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        let patient = registry.register(jane(), 1).unwrap();
        let record = registry
            .add_health_record(
                &patient.patient_id,
                NewHealthRecord {
                    location_id: 1,
                    weight_kg: Some(65.5),
                    recorded_by: "Dr. Adams".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(record.weight_kg, Some(65.5));

        let records = registry.health_records(&patient.patient_id).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_health_record_unknown_patient() {
        let db = setup_db();
        let registry = PatientRegistry::new(&db);

        let err = registry
            .add_health_record(
                "PAT999999",
                NewHealthRecord {
                    location_id: 1,
                    recorded_by: "Dr. Adams".into(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownPatient(_)));
    }
}
