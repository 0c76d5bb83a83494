use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionSnapshot;

/// Every state change in a fasting session produces an Event.
/// Front ends render them; the ticker broadcasts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FastStarted {
        start_ms: i64,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    FastPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    FastReset {
        start_ms: i64,
        estimated_end_ms: Option<i64>,
        at: DateTime<Utc>,
    },
    StartInstantChanged {
        start_ms: i64,
        elapsed_ms: u64,
        estimated_end_ms: Option<i64>,
        at: DateTime<Utc>,
    },
    TargetChanged {
        target_hours: u32,
        estimated_end_ms: Option<i64>,
        at: DateTime<Utc>,
    },
    /// Elapsed time crossed into a different phase.
    PhaseEntered {
        phase_index: usize,
        phase_name: String,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot(SessionSnapshot),
}

/// Convert epoch milliseconds to a UTC timestamp, falling back to the epoch
/// for values chrono cannot represent.
pub fn timestamp(epoch_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_ms).unwrap_or_default()
}
