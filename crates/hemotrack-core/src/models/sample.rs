//! Blood sample models and lifecycle states.

use serde::{Deserialize, Serialize};

/// Flat status discriminant, used for queries and worklists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    Collected,
    Tested,
    ResultsSent,
}

impl SampleStatus {
    /// Stable label persisted in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStatus::Collected => "collected",
            SampleStatus::Tested => "tested",
            SampleStatus::ResultsSent => "results_sent",
        }
    }
}

impl std::fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields recorded when a sample is tested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestOutcome {
    /// Literal results text; never altered or truncated downstream
    pub results: String,
    /// Facility that ran the test
    pub test_location_id: i64,
    /// Technician who entered the results
    pub technician_name: String,
    /// When the results were recorded
    pub tested_at: String,
}

/// Lifecycle state of a blood sample.
///
/// One-directional: `Collected` -> `Tested` -> `ResultsSent`, no state is
/// re-enterable. Each variant carries only the fields valid in that state,
/// so "results are set iff the sample has been tested" holds by
/// construction instead of by runtime checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleState {
    /// Drawn and waiting for result entry
    Collected,
    /// Results recorded, notification not yet sent
    Tested { outcome: TestOutcome },
    /// Terminal: results delivered to the patient
    ResultsSent {
        outcome: TestOutcome,
        notification_sent_at: String,
    },
}

impl SampleState {
    pub fn status(&self) -> SampleStatus {
        match self {
            SampleState::Collected => SampleStatus::Collected,
            SampleState::Tested { .. } => SampleStatus::Tested,
            SampleState::ResultsSent { .. } => SampleStatus::ResultsSent,
        }
    }

    pub fn test_outcome(&self) -> Option<&TestOutcome> {
        match self {
            SampleState::Collected => None,
            SampleState::Tested { outcome } => Some(outcome),
            SampleState::ResultsSent { outcome, .. } => Some(outcome),
        }
    }

    pub fn notification_sent_at(&self) -> Option<&str> {
        match self {
            SampleState::ResultsSent {
                notification_sent_at,
                ..
            } => Some(notification_sent_at),
            _ => None,
        }
    }
}

/// A blood sample and its current lifecycle state.
///
/// Samples are created only through collection, advanced only through the
/// lifecycle manager, and never deleted (audit trail).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloodSample {
    /// Sample identifier (`BS` + 6-digit sequence), immutable and globally
    /// unique
    pub sample_id: String,
    /// Owning patient's registry identifier
    pub patient_id: String,
    /// Facility where the sample was drawn
    pub collection_location_id: i64,
    /// Ordered test (e.g. "CBC")
    pub test_type: String,
    /// Person who drew the sample
    pub collector_name: String,
    pub state: SampleState,
    /// When the sample was drawn
    pub collected_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl BloodSample {
    /// Build a freshly collected sample with an allocated identifier.
    pub fn collected(
        sample_id: String,
        patient_id: String,
        collection_location_id: i64,
        test_type: String,
        collector_name: String,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            sample_id,
            patient_id,
            collection_location_id,
            test_type,
            collector_name,
            state: SampleState::Collected,
            collected_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn status(&self) -> SampleStatus {
        self.state.status()
    }
}
