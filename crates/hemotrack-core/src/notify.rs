//! Results notification dispatch.
//!
//! The dispatcher reads the sample's state to decide eligibility, hands the
//! message to a provider behind the [`MessageSender`] capability, and only
//! after a confirmed send advances the sample to `results_sent`. A failed
//! provider call changes nothing and may simply be retried.

use std::time::Duration;

use thiserror::Error;

use crate::db::Database;
use crate::models::{BloodSample, DispatchOutcome, NotificationRecord, Patient, SampleState, TestOutcome};
use crate::{CoreError, CoreResult};

/// Errors surfaced by messaging providers.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// Capability interface for the outbound messaging provider.
///
/// Implementations must bound the call with a timeout and report expiry as
/// [`SendError::Timeout`]; the dispatcher treats any error as a failed
/// attempt, never as a transition.
pub trait MessageSender {
    /// Deliver `body` to `recipient`. `message_ref` is an idempotency key
    /// unique per attempt; providers may use it to deduplicate retries.
    fn send(&self, recipient: &str, body: &str, message_ref: &str) -> Result<(), SendError>;
}

/// Provider that only logs the message (development and tests).
#[derive(Debug, Default)]
pub struct SimulatedSender;

impl MessageSender for SimulatedSender {
    fn send(&self, recipient: &str, body: &str, message_ref: &str) -> Result<(), SendError> {
        tracing::info!("simulated send {} to {}:\n{}", message_ref, recipient, body);
        Ok(())
    }
}

/// Dispatches result notifications and records their outcome.
pub struct NotificationDispatcher<'a> {
    db: &'a Database,
    sender: &'a dyn MessageSender,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(db: &'a Database, sender: &'a dyn MessageSender) -> Self {
        Self { db, sender }
    }

    /// Send the results for a tested sample and advance it to
    /// `results_sent`.
    ///
    /// Only a sample currently in `tested` is eligible: notifying before
    /// results exist or re-notifying after a send are both refused with
    /// `InvalidTransition`. Each attempt is recorded in the notifications
    /// log under a fresh message reference.
    pub fn dispatch(&self, sample_id: &str) -> CoreResult<DispatchOutcome> {
        let sample = self
            .db
            .get_sample(sample_id)?
            .ok_or_else(|| CoreError::UnknownSample(sample_id.to_string()))?;
        let outcome = match &sample.state {
            SampleState::Tested { outcome } => outcome.clone(),
            _ => {
                return Err(CoreError::InvalidTransition {
                    sample_id: sample.sample_id.clone(),
                    current: sample.status(),
                    operation: "dispatch",
                })
            }
        };
        let patient = self
            .db
            .get_patient(&sample.patient_id)?
            .ok_or_else(|| CoreError::UnknownPatient(sample.patient_id.clone()))?;

        let body = results_message(&patient, &sample, &outcome);
        let message_ref = uuid::Uuid::new_v4().to_string();

        if let Err(e) = self.sender.send(&patient.phone, &body, &message_ref) {
            let reason = e.to_string();
            tracing::warn!("dispatch for sample {} failed: {}", sample_id, reason);
            self.db
                .log_failed_dispatch(&message_ref, sample_id, &patient.phone, &reason)?;
            return Ok(DispatchOutcome::Failed { reason });
        }

        let sent_at = chrono::Utc::now().to_rfc3339();
        let swapped = self
            .db
            .complete_dispatch(&message_ref, sample_id, &patient.phone, &sent_at)?;
        if swapped {
            tracing::info!("sample {} results sent to {}", sample_id, patient.phone);
            Ok(DispatchOutcome::Sent)
        } else {
            // the provider call succeeded, but a concurrent dispatch had
            // already advanced the sample
            tracing::warn!("sample {} was already marked results_sent", sample_id);
            Ok(DispatchOutcome::AlreadySent)
        }
    }

    /// Dispatch history for a sample, oldest attempt first.
    pub fn history(&self, sample_id: &str) -> CoreResult<Vec<NotificationRecord>> {
        if self.db.get_sample(sample_id)?.is_none() {
            return Err(CoreError::UnknownSample(sample_id.to_string()));
        }
        Ok(self.db.list_notifications(sample_id)?)
    }
}

/// Build the outbound message body.
///
/// Carries the patient display name, patient and sample identifiers, the
/// test type and the literal results text. Results are passed through
/// unaltered and untruncated.
pub fn results_message(patient: &Patient, sample: &BloodSample, outcome: &TestOutcome) -> String {
    format!(
        "MEDICAL TEST RESULTS\n\
         \n\
         Patient: {}\n\
         Patient ID: {}\n\
         Sample ID: {}\n\
         Test Type: {}\n\
         \n\
         Results:\n\
         {}\n\
         \n\
         Tested by: {}\n\
         Test Date: {}\n\
         \n\
         For questions, please contact your healthcare provider.",
        patient.name,
        patient.patient_id,
        sample.sample_id,
        sample.test_type,
        outcome.results,
        outcome.technician_name,
        outcome.tested_at,
    )
}
