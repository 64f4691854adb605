//! Aggregation engine
//!
//! Read-only analytical queries over the event log: spot popularity, user
//! activity, overall usage statistics, and a combined dashboard. Every query
//! takes one snapshot of the log, reconstructs sessions once, and aggregates
//! from that - mid-query appends are never observed, and the dashboard's
//! three sub-results always agree with each other.
//!
//! Anomalous data degrades gracefully: flagged sessions still count toward
//! session totals, but a session with no usable duration contributes zero
//! hours and is excluded from the duration average.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event_store::EventStore;
use crate::sessions::reconstruct_sessions;
use crate::types::{Session, Window};

/// Default number of rows in ranked results and the dashboard
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Ranked usage of one parking spot
#[derive(Debug, Clone, Serialize, async_graphql::SimpleObject)]
pub struct SpotUsage {
    pub spot_id: i64,
    pub session_count: u64,
    pub total_duration_hours: f64,
}

/// Ranked activity of one user
#[derive(Debug, Clone, Serialize, async_graphql::SimpleObject)]
pub struct UserActivity {
    pub user_id: String,
    pub session_count: u64,
    pub total_duration_hours: f64,
}

/// Overall usage statistics
#[derive(Debug, Clone, Serialize, async_graphql::SimpleObject)]
pub struct UsageStats {
    /// All reconstructed sessions, flagged ones included
    pub total_sessions: u64,
    /// Distinct users across sessions
    pub total_users: u64,
    /// Distinct spots across sessions
    pub total_spots: u64,
    /// Sum of all usable session durations
    pub total_duration_hours: f64,
    /// Mean over fully paired sessions only; zero when there are none
    pub average_duration_hours: f64,
}

/// Combined dashboard payload
#[derive(Debug, Clone, Serialize, async_graphql::SimpleObject)]
pub struct Dashboard {
    pub popular_spots: Vec<SpotUsage>,
    pub frequent_users: Vec<UserActivity>,
    pub usage_stats: UsageStats,
    pub last_updated: DateTime<Utc>,
}

/// The aggregation engine
///
/// Holds the event store and derives everything per query; no state of its
/// own, so REST and GraphQL consumers always see the same numbers for the
/// same log.
#[derive(Clone)]
pub struct AnalyticsEngine {
    store: Arc<EventStore>,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self { store }
    }

    /// Top spots by session count
    pub fn popular_spots(&self, limit: usize, window: &Window) -> Vec<SpotUsage> {
        rank_spots(&self.snapshot_sessions(), limit, window)
    }

    /// Top users by session count
    pub fn frequent_users(&self, limit: usize, window: &Window) -> Vec<UserActivity> {
        rank_users(&self.snapshot_sessions(), limit, window)
    }

    /// Overall usage statistics
    pub fn usage_stats(&self, window: &Window) -> UsageStats {
        compute_stats(&self.snapshot_sessions(), window)
    }

    /// All three aggregations from one consistent snapshot
    ///
    /// The log is read exactly once here; the three sub-results can never
    /// disagree about which events existed.
    pub fn dashboard(&self, limit: usize, window: &Window) -> Dashboard {
        let sessions = self.snapshot_sessions();

        Dashboard {
            popular_spots: rank_spots(&sessions, limit, window),
            frequent_users: rank_users(&sessions, limit, window),
            usage_stats: compute_stats(&sessions, window),
            last_updated: Utc::now(),
        }
    }

    fn snapshot_sessions(&self) -> Vec<Session> {
        reconstruct_sessions(&self.store.list_all())
    }
}

/// Sessions inside the window, by their start (or release time for orphans)
fn in_window<'a>(sessions: &'a [Session], window: &'a Window) -> impl Iterator<Item = &'a Session> {
    sessions
        .iter()
        .filter(|s| s.window_key().is_some_and(|key| window.contains(key)))
}

/// Usable, non-negative duration of a session; flagged sessions with no
/// trustworthy duration contribute zero
fn usable_hours(session: &Session) -> f64 {
    session.duration_hours.unwrap_or(0.0)
}

fn rank_spots(sessions: &[Session], limit: usize, window: &Window) -> Vec<SpotUsage> {
    let mut totals: HashMap<i64, (u64, f64)> = HashMap::new();
    for session in in_window(sessions, window) {
        let entry = totals.entry(session.spot_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += usable_hours(session);
    }

    let mut rows: Vec<SpotUsage> = totals
        .into_iter()
        .map(|(spot_id, (session_count, total_duration_hours))| SpotUsage {
            spot_id,
            session_count,
            total_duration_hours,
        })
        .collect();

    // Count desc, then hours desc, then spot id asc for determinism
    rows.sort_by(|a, b| {
        b.session_count
            .cmp(&a.session_count)
            .then_with(|| {
                b.total_duration_hours
                    .partial_cmp(&a.total_duration_hours)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.spot_id.cmp(&b.spot_id))
    });
    rows.truncate(limit);
    rows
}

fn rank_users(sessions: &[Session], limit: usize, window: &Window) -> Vec<UserActivity> {
    let mut totals: HashMap<&str, (u64, f64)> = HashMap::new();
    for session in in_window(sessions, window) {
        // Sessions with no attributable user cannot appear in a per-user
        // ranking; they still count in usage_stats
        if let Some(user_id) = session.user_id.as_deref() {
            let entry = totals.entry(user_id).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += usable_hours(session);
        }
    }

    let mut rows: Vec<UserActivity> = totals
        .into_iter()
        .map(|(user_id, (session_count, total_duration_hours))| UserActivity {
            user_id: user_id.to_string(),
            session_count,
            total_duration_hours,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.session_count
            .cmp(&a.session_count)
            .then_with(|| {
                b.total_duration_hours
                    .partial_cmp(&a.total_duration_hours)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    rows.truncate(limit);
    rows
}

fn compute_stats(sessions: &[Session], window: &Window) -> UsageStats {
    let mut total_sessions = 0u64;
    let mut users: std::collections::HashSet<&str> = std::collections::HashSet::new();
    let mut spots: std::collections::HashSet<i64> = std::collections::HashSet::new();
    let mut total_duration_hours = 0.0;
    let mut paired_hours = 0.0;
    let mut paired_count = 0u64;

    for session in in_window(sessions, window) {
        total_sessions += 1;
        if let Some(user_id) = session.user_id.as_deref() {
            users.insert(user_id);
        }
        spots.insert(session.spot_id);
        total_duration_hours += usable_hours(session);

        // The average covers only fully paired sessions with a usable
        // duration; orphans and anomalies are counted above but not here
        if session.is_closed() {
            if let Some(hours) = session.duration_hours {
                paired_hours += hours;
                paired_count += 1;
            }
        }
    }

    let average_duration_hours = if paired_count > 0 {
        paired_hours / paired_count as f64
    } else {
        0.0
    };

    UsageStats {
        total_sessions,
        total_users: users.len() as u64,
        total_spots: spots.len() as u64,
        total_duration_hours,
        average_duration_hours,
    }
}
