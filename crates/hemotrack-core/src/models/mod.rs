//! Domain models for the hemotrack system.

mod health_record;
mod location;
mod notification;
mod patient;
mod sample;

pub use health_record::*;
pub use location::*;
pub use notification::*;
pub use patient::*;
pub use sample::*;

use serde::Serialize;

/// Counters for the front page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_patients: i64,
    pub total_locations: i64,
    /// Samples still in `collected`, waiting for result entry
    pub samples_pending_testing: i64,
    /// Samples in `tested`, waiting for their notification
    pub samples_awaiting_dispatch: i64,
}
