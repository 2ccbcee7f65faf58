//! Health record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{HealthRecord, NewHealthRecord};

const RECORD_COLUMNS: &str = "id, patient_id, location_id, height_cm, weight_kg, \
                              temperature_c, blood_pressure_systolic, \
                              blood_pressure_diastolic, heart_rate, notes, \
                              recorded_by, recorded_at";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<HealthRecord> {
    Ok(HealthRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        location_id: row.get(2)?,
        height_cm: row.get(3)?,
        weight_kg: row.get(4)?,
        temperature_c: row.get(5)?,
        blood_pressure_systolic: row.get(6)?,
        blood_pressure_diastolic: row.get(7)?,
        heart_rate: row.get(8)?,
        notes: row.get(9)?,
        recorded_by: row.get(10)?,
        recorded_at: row.get(11)?,
    })
}

impl Database {
    /// Append a health record to a patient.
    pub fn insert_health_record(
        &self,
        patient_id: &str,
        record: &NewHealthRecord,
    ) -> DbResult<HealthRecord> {
        self.conn.execute(
            r#"
            INSERT INTO health_records (
                patient_id, location_id, height_cm, weight_kg, temperature_c,
                blood_pressure_systolic, blood_pressure_diastolic, heart_rate,
                notes, recorded_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                patient_id,
                record.location_id,
                record.height_cm,
                record.weight_kg,
                record.temperature_c,
                record.blood_pressure_systolic,
                record.blood_pressure_diastolic,
                record.heart_rate,
                record.notes,
                record.recorded_by,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM health_records WHERE id = ?"),
                [id],
                record_from_row,
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("health record {id}")))
    }

    /// List a patient's health records, newest first.
    pub fn list_health_records(&self, patient_id: &str) -> DbResult<Vec<HealthRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM health_records
            WHERE patient_id = ?
            ORDER BY recorded_at DESC, id DESC
            "#
        ))?;

        let rows = stmt.query_map([patient_id], record_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
