//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{is_duplicate_id, Database, DbError, DbResult};
use crate::models::Patient;

const PATIENT_COLUMNS: &str = "patient_id, name, date_of_birth, gender, phone, email, \
                               address, emergency_contact, registration_location_id, \
                               created_at, updated_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        date_of_birth: row.get(2)?,
        gender: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        address: row.get(6)?,
        emergency_contact: row.get(7)?,
        registration_location_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl Database {
    /// Insert a new patient.
    ///
    /// Fails with [`DbError::DuplicateId`] when the identifier was claimed
    /// by a concurrent writer; callers allocate a fresh ID and retry.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO patients (
                    patient_id, name, date_of_birth, gender, phone, email,
                    address, emergency_contact, registration_location_id,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    patient.patient_id,
                    patient.name,
                    patient.date_of_birth,
                    patient.gender,
                    patient.phone,
                    patient.email,
                    patient.address,
                    patient.emergency_contact,
                    patient.registration_location_id,
                    patient.created_at,
                    patient.updated_at,
                ],
            )
            .map_err(|e| {
                if is_duplicate_id(&e) {
                    DbError::DuplicateId(patient.patient_id.clone())
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    /// Get a patient by registry identifier.
    pub fn get_patient(&self, patient_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?"),
                [patient_id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Search patients by identifier prefix or name substring.
    ///
    /// Ordered by patient_id ascending so results are stable and
    /// reproducible across calls.
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let id_pattern = format!("{}%", query.trim().to_uppercase());
        let name_pattern = format!("%{}%", query.trim());
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE patient_id LIKE ?1 OR name LIKE ?2
            ORDER BY patient_id
            LIMIT ?3
            "#
        ))?;

        let rows = stmt.query_map(
            params![id_pattern, name_pattern, limit as i64],
            patient_from_row,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Total number of registered patients.
    pub fn count_patients(&self) -> DbResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
