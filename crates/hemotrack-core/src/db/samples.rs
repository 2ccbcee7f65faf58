//! Blood sample database operations.
//!
//! Status transitions use conditional updates (`WHERE sample_id = ? AND
//! status = ?`): the rows-affected count tells the caller whether it won the
//! transition. Per-sample mutual exclusion comes from these compare-and-swap
//! writes, not from a process-wide lock, so the layer stays correct when
//! several processes share the database file.

use rusqlite::{params, OptionalExtension, Row};

use super::{is_duplicate_id, Database, DbError, DbResult};
use crate::models::{BloodSample, SampleState, SampleStatus, TestOutcome};

const SAMPLE_COLUMNS: &str = "sample_id, patient_id, collection_location_id, test_type, \
                              collector_name, status, results, test_location_id, \
                              technician_name, tested_at, notification_sent_at, \
                              collected_at, updated_at";

/// Intermediate row struct for database mapping.
struct SampleRow {
    sample_id: String,
    patient_id: String,
    collection_location_id: i64,
    test_type: String,
    collector_name: String,
    status: String,
    results: Option<String>,
    test_location_id: Option<i64>,
    technician_name: Option<String>,
    tested_at: Option<String>,
    notification_sent_at: Option<String>,
    collected_at: String,
    updated_at: String,
}

fn sample_row(row: &Row<'_>) -> rusqlite::Result<SampleRow> {
    Ok(SampleRow {
        sample_id: row.get(0)?,
        patient_id: row.get(1)?,
        collection_location_id: row.get(2)?,
        test_type: row.get(3)?,
        collector_name: row.get(4)?,
        status: row.get(5)?,
        results: row.get(6)?,
        test_location_id: row.get(7)?,
        technician_name: row.get(8)?,
        tested_at: row.get(9)?,
        notification_sent_at: row.get(10)?,
        collected_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl SampleRow {
    fn test_outcome(&self) -> Result<TestOutcome, DbError> {
        let missing = || {
            DbError::Constraint(format!(
                "sample {} is {} but has incomplete test fields",
                self.sample_id, self.status
            ))
        };
        Ok(TestOutcome {
            results: self.results.clone().ok_or_else(missing)?,
            test_location_id: self.test_location_id.ok_or_else(missing)?,
            technician_name: self.technician_name.clone().ok_or_else(missing)?,
            tested_at: self.tested_at.clone().ok_or_else(missing)?,
        })
    }
}

impl TryFrom<SampleRow> for BloodSample {
    type Error = DbError;

    fn try_from(row: SampleRow) -> Result<Self, Self::Error> {
        let state = match row.status.as_str() {
            "collected" => {
                if row.results.is_some() || row.notification_sent_at.is_some() {
                    return Err(DbError::Constraint(format!(
                        "sample {} is collected but carries test fields",
                        row.sample_id
                    )));
                }
                SampleState::Collected
            }
            "tested" => {
                if row.notification_sent_at.is_some() {
                    return Err(DbError::Constraint(format!(
                        "sample {} is tested but carries a notification timestamp",
                        row.sample_id
                    )));
                }
                SampleState::Tested {
                    outcome: row.test_outcome()?,
                }
            }
            "results_sent" => SampleState::ResultsSent {
                outcome: row.test_outcome()?,
                notification_sent_at: row.notification_sent_at.clone().ok_or_else(|| {
                    DbError::Constraint(format!(
                        "sample {} is results_sent without a notification timestamp",
                        row.sample_id
                    ))
                })?,
            },
            other => {
                return Err(DbError::Constraint(format!(
                    "Unknown sample status: {other}"
                )))
            }
        };

        Ok(BloodSample {
            sample_id: row.sample_id,
            patient_id: row.patient_id,
            collection_location_id: row.collection_location_id,
            test_type: row.test_type,
            collector_name: row.collector_name,
            state,
            collected_at: row.collected_at,
            updated_at: row.updated_at,
        })
    }
}

impl Database {
    /// Insert a freshly collected sample.
    ///
    /// Fails with [`DbError::DuplicateId`] when the identifier was claimed
    /// by a concurrent writer; callers allocate a fresh ID and retry.
    pub fn insert_sample(&self, sample: &BloodSample) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO blood_samples (
                    sample_id, patient_id, collection_location_id, test_type,
                    collector_name, status, collected_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    sample.sample_id,
                    sample.patient_id,
                    sample.collection_location_id,
                    sample.test_type,
                    sample.collector_name,
                    sample.status().as_str(),
                    sample.collected_at,
                    sample.updated_at,
                ],
            )
            .map_err(|e| {
                if is_duplicate_id(&e) {
                    DbError::DuplicateId(sample.sample_id.clone())
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    /// Get a sample by identifier.
    pub fn get_sample(&self, sample_id: &str) -> DbResult<Option<BloodSample>> {
        self.conn
            .query_row(
                &format!("SELECT {SAMPLE_COLUMNS} FROM blood_samples WHERE sample_id = ?"),
                [sample_id],
                sample_row,
            )
            .optional()?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Advance a sample from `collected` to `tested`, storing the outcome.
    ///
    /// Conditional on the current status: returns false when the sample was
    /// not in `collected`, leaving the row untouched.
    pub fn mark_tested(&self, sample_id: &str, outcome: &TestOutcome) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE blood_samples SET
                status = 'tested',
                results = ?2,
                test_location_id = ?3,
                technician_name = ?4,
                tested_at = ?5,
                updated_at = datetime('now')
            WHERE sample_id = ?1 AND status = 'collected'
            "#,
            params![
                sample_id,
                outcome.results,
                outcome.test_location_id,
                outcome.technician_name,
                outcome.tested_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// List samples in a given status, oldest collection first (FIFO
    /// worklist discipline).
    pub fn list_samples_by_status(&self, status: SampleStatus) -> DbResult<Vec<BloodSample>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {SAMPLE_COLUMNS}
            FROM blood_samples
            WHERE status = ?
            ORDER BY collected_at, sample_id
            "#
        ))?;

        let rows = stmt.query_map([status.as_str()], sample_row)?;
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?.try_into()?);
        }
        Ok(samples)
    }

    /// List all samples for a patient, newest collection first.
    pub fn list_samples_for_patient(&self, patient_id: &str) -> DbResult<Vec<BloodSample>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {SAMPLE_COLUMNS}
            FROM blood_samples
            WHERE patient_id = ?
            ORDER BY collected_at DESC, sample_id DESC
            "#
        ))?;

        let rows = stmt.query_map([patient_id], sample_row)?;
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?.try_into()?);
        }
        Ok(samples)
    }

    /// Number of samples currently in a status.
    pub fn count_samples_with_status(&self, status: SampleStatus) -> DbResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM blood_samples WHERE status = ?",
                [status.as_str()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
