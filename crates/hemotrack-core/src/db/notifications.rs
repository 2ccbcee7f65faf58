//! Notification audit log operations.

use rusqlite::{params, Row};

use super::{Database, DbError, DbResult};
use crate::models::{DispatchOutcome, NotificationRecord};

struct NotificationRow {
    message_ref: String,
    sample_id: String,
    recipient: String,
    outcome: String,
    error: Option<String>,
    created_at: String,
}

fn notification_row(row: &Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        message_ref: row.get(0)?,
        sample_id: row.get(1)?,
        recipient: row.get(2)?,
        outcome: row.get(3)?,
        error: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl TryFrom<NotificationRow> for NotificationRecord {
    type Error = DbError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let outcome = match row.outcome.as_str() {
            "sent" => DispatchOutcome::Sent,
            "already_sent" => DispatchOutcome::AlreadySent,
            "failed" => DispatchOutcome::Failed {
                reason: row.error.clone().unwrap_or_default(),
            },
            other => {
                return Err(DbError::Constraint(format!(
                    "Unknown dispatch outcome: {other}"
                )))
            }
        };
        Ok(NotificationRecord {
            message_ref: row.message_ref,
            sample_id: row.sample_id,
            recipient: row.recipient,
            outcome,
            created_at: row.created_at,
        })
    }
}

impl Database {
    /// Log a dispatch attempt that never reached the transition (provider
    /// rejected or timed out). The sample row is untouched.
    pub fn log_failed_dispatch(
        &self,
        message_ref: &str,
        sample_id: &str,
        recipient: &str,
        reason: &str,
    ) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO notifications (message_ref, sample_id, recipient, outcome, error)
            VALUES (?1, ?2, ?3, 'failed', ?4)
            "#,
            params![message_ref, sample_id, recipient, reason],
        )?;
        Ok(())
    }

    /// After a successful provider call, advance the sample from `tested`
    /// to `results_sent` and log the attempt in a single transaction.
    ///
    /// Returns false when the conditional update lost (the sample was no
    /// longer `tested`); the attempt is then logged as `already_sent` and
    /// the sample row stays exactly as the winner left it.
    pub fn complete_dispatch(
        &self,
        message_ref: &str,
        sample_id: &str,
        recipient: &str,
        sent_at: &str,
    ) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let swapped = tx.execute(
            r#"
            UPDATE blood_samples SET
                status = 'results_sent',
                notification_sent_at = ?2,
                updated_at = datetime('now')
            WHERE sample_id = ?1 AND status = 'tested'
            "#,
            params![sample_id, sent_at],
        )? > 0;

        let outcome = if swapped { "sent" } else { "already_sent" };
        tx.execute(
            r#"
            INSERT INTO notifications (message_ref, sample_id, recipient, outcome)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![message_ref, sample_id, recipient, outcome],
        )?;
        tx.commit()?;
        Ok(swapped)
    }

    /// Dispatch history for a sample, oldest attempt first.
    pub fn list_notifications(&self, sample_id: &str) -> DbResult<Vec<NotificationRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT message_ref, sample_id, recipient, outcome, error, created_at
            FROM notifications
            WHERE sample_id = ?
            ORDER BY created_at, message_ref
            "#,
        )?;

        let rows = stmt.query_map([sample_id], notification_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }
}
