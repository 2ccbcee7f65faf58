//! Per-namespace maximum-suffix reads for identifier allocation.

use super::{Database, DbError, DbResult};
use crate::ids::{parse_suffix, Namespace};

impl Database {
    /// Highest numeric suffix persisted for a namespace, 0 when the
    /// namespace is empty.
    ///
    /// `MAX()` over the identifier column is correct because the suffix is
    /// zero-padded to a fixed width, so lexicographic order equals numeric
    /// order.
    pub fn max_id_suffix(&self, namespace: Namespace) -> DbResult<u32> {
        let sql = match namespace {
            Namespace::Patient => "SELECT MAX(patient_id) FROM patients",
            Namespace::Sample => "SELECT MAX(sample_id) FROM blood_samples",
        };
        let max: Option<String> = self.conn.query_row(sql, [], |row| row.get(0))?;
        match max {
            None => Ok(0),
            Some(id) => parse_suffix(namespace, &id).ok_or_else(|| {
                DbError::Constraint(format!("malformed identifier in store: {id}"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPatient, Patient};

    fn make_patient(patient_id: &str) -> Patient {
        Patient::from_new(
            patient_id.into(),
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
    }

    #[test]
    fn test_empty_namespace() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.max_id_suffix(Namespace::Patient).unwrap(), 0);
        assert_eq!(db.max_id_suffix(Namespace::Sample).unwrap(), 0);
    }

    #[test]
    fn test_max_tracks_highest_suffix() {
        let db = Database::open_in_memory().unwrap();

        db.insert_patient(&make_patient("PAT000001")).unwrap();
        db.insert_patient(&make_patient("PAT000007")).unwrap();
        db.insert_patient(&make_patient("PAT000003")).unwrap();

        assert_eq!(db.max_id_suffix(Namespace::Patient).unwrap(), 7);
        // namespaces are independent
        assert_eq!(db.max_id_suffix(Namespace::Sample).unwrap(), 0);
    }

    #[test]
    fn test_malformed_identifier_is_reported() {
        let db = Database::open_in_memory().unwrap();
        // bypass the typed API with a row that breaks the format contract;
        // 'PAT9999990' sorts above every well-formed id
        db.conn()
            .execute(
                "INSERT INTO patients (patient_id, name, date_of_birth, gender, phone, registration_location_id)
                 VALUES ('PAT9999990', 'Bad Row', '1990-01-01', 'F', '555-0100', 1)",
                [],
            )
            .unwrap();

        let err = db.max_id_suffix(Namespace::Patient).unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }
}
