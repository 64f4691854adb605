//! Derived session type
//!
//! A session pairs one occupy event with the next release event for the same
//! spot. Sessions are never stored - they are recomputed from the event log
//! whenever an aggregation query needs them.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A reconstructed occupancy session
///
/// Exactly one session record accounts for every event in the log. Flags
/// mark the ways a session can deviate from the clean occupy-then-release
/// shape; flagged sessions are surfaced, never dropped.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub spot_id: i64,
    /// The occupying user, or the releasing user for orphaned sessions
    pub user_id: Option<String>,
    /// Occupy timestamp; absent for orphaned sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// Release timestamp; absent for open and anomalous sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Usable duration in hours; absent when no non-negative duration
    /// can be derived or trusted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    /// Open session superseded by a second occupy, or a negative derived
    /// duration
    pub anomalous: bool,
    /// Release with no matching prior occupy
    pub orphaned: bool,
    /// Declared duration disagreed with the timestamp-derived one; the
    /// derived value won
    pub reconciled: bool,
    /// Releasing user differed from the occupying user
    pub user_mismatch: bool,
}

impl Session {
    /// Whether both endpoints are present (a fully paired session)
    pub fn is_closed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// The timestamp that places this session in an aggregation window:
    /// the start, or the release time for orphaned sessions.
    pub fn window_key(&self) -> Option<DateTime<Utc>> {
        self.start.or(self.end)
    }
}
