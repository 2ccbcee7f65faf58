//! Notification dispatch models.

use serde::{Deserialize, Serialize};

/// Result of a dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Provider accepted the message and the sample advanced to
    /// `results_sent`
    Sent,
    /// Provider accepted the message, but a concurrent dispatch had already
    /// advanced the sample; no second transition happened
    AlreadySent,
    /// Provider rejected or timed out; the sample stays `tested` and the
    /// dispatch may be retried
    Failed { reason: String },
}

impl DispatchOutcome {
    /// Stable label persisted in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent => "sent",
            DispatchOutcome::AlreadySent => "already_sent",
            DispatchOutcome::Failed { .. } => "failed",
        }
    }
}

/// A logged dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRecord {
    /// Idempotency key handed to the provider
    pub message_ref: String,
    pub sample_id: String,
    /// Phone number the message was addressed to
    pub recipient: String,
    pub outcome: DispatchOutcome,
    pub created_at: String,
}
