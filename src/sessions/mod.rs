//! Session reconstruction
//!
//! Derives occupancy sessions from the raw event log by pairing each occupy
//! event with the next release event for the same spot. This is a pure
//! function over an ordered event slice: nothing here touches storage, and
//! the result is recomputed from a fresh snapshot on every query.
//!
//! The pairing policy guarantees every event is accounted for in exactly one
//! session record. Irregular data is flagged, never dropped:
//! - a second occupy before a release closes the prior session as
//!   `anomalous` with no end,
//! - a release with no pending occupy becomes an `orphaned` session,
//! - a declared duration that disagrees with the timestamp-derived one is
//!   overridden and the session marked `reconciled`,
//! - a release by a different user than the occupier sets `user_mismatch`.

use std::collections::HashMap;

use crate::types::{ParkingAction, ParkingEvent, Session};

/// Allowed disagreement, in hours, between a declared duration and the
/// timestamp-derived one before a session is marked reconciled (36 seconds).
pub const DURATION_TOLERANCE_HOURS: f64 = 0.01;

/// Reconstruct sessions for the whole log
///
/// Events are grouped per spot and each spot's events are scanned in
/// (timestamp, id) order. Spots appear in first-seen order so the output is
/// deterministic for a given log.
pub fn reconstruct_sessions(events: &[ParkingEvent]) -> Vec<Session> {
    let mut spot_order: Vec<i64> = Vec::new();
    let mut by_spot: HashMap<i64, Vec<&ParkingEvent>> = HashMap::new();

    for event in events {
        let entry = by_spot.entry(event.spot_id).or_default();
        if entry.is_empty() {
            spot_order.push(event.spot_id);
        }
        entry.push(event);
    }

    let mut sessions = Vec::new();
    for spot_id in spot_order {
        let mut spot_events = by_spot.remove(&spot_id).unwrap_or_default();
        spot_events.sort_by_key(|e| (e.timestamp, e.id));
        sessions.extend(sessions_for_spot(spot_id, &spot_events));
    }

    sessions
}

/// Scan one spot's events, already in timestamp order, into sessions
///
/// Maintains at most one pending open occupy. The scan trusts the given
/// order; if a caller hands over events where a release precedes its occupy,
/// the resulting negative derived duration is flagged as anomalous and kept
/// out of every numeric aggregate.
pub fn sessions_for_spot(spot_id: i64, events: &[&ParkingEvent]) -> Vec<Session> {
    let mut sessions = Vec::new();
    let mut pending: Option<&ParkingEvent> = None;

    for event in events {
        match event.action {
            ParkingAction::Occupy => {
                // A second occupy terminates the prior pending session
                if let Some(open) = pending.take() {
                    sessions.push(anomalous_open(spot_id, open));
                }
                pending = Some(event);
            }
            ParkingAction::Release => match pending.take() {
                Some(open) => sessions.push(close_session(spot_id, open, event)),
                None => sessions.push(orphaned(spot_id, event)),
            },
        }
    }

    // A trailing occupy is a legitimately open session, not an anomaly
    if let Some(open) = pending {
        sessions.push(Session {
            spot_id,
            user_id: Some(open.user_id.clone()),
            start: Some(open.timestamp),
            end: None,
            duration_hours: None,
            anomalous: false,
            orphaned: false,
            reconciled: false,
            user_mismatch: false,
        });
    }

    sessions
}

/// Pair an occupy with its release into a closed session
fn close_session(spot_id: i64, open: &ParkingEvent, release: &ParkingEvent) -> Session {
    let derived = (release.timestamp - open.timestamp).num_milliseconds() as f64 / 3_600_000.0;

    // A negative derived duration is a data anomaly. It is never summed
    // into totals, so it carries no usable duration.
    let (duration_hours, anomalous) = if derived < 0.0 {
        (None, true)
    } else {
        (Some(derived), false)
    };

    // The derived value always wins; a disagreeing declared value is
    // recorded via the reconciled flag rather than believed.
    let reconciled = match (duration_hours, release.duration_hours) {
        (Some(computed), Some(declared)) => {
            (declared - computed).abs() > DURATION_TOLERANCE_HOURS
        }
        _ => false,
    };

    Session {
        spot_id,
        user_id: Some(open.user_id.clone()),
        start: Some(open.timestamp),
        end: Some(release.timestamp),
        duration_hours,
        anomalous,
        orphaned: false,
        reconciled,
        user_mismatch: release.user_id != open.user_id,
    }
}

/// A pending occupy superseded by a second occupy on the same spot
fn anomalous_open(spot_id: i64, open: &ParkingEvent) -> Session {
    Session {
        spot_id,
        user_id: Some(open.user_id.clone()),
        start: Some(open.timestamp),
        end: None,
        duration_hours: None,
        anomalous: true,
        orphaned: false,
        reconciled: false,
        user_mismatch: false,
    }
}

/// A release with no pending occupy
///
/// The declared duration is the only duration information available, so it
/// is used when present and non-negative.
fn orphaned(spot_id: i64, release: &ParkingEvent) -> Session {
    Session {
        spot_id,
        user_id: Some(release.user_id.clone()),
        start: None,
        end: Some(release.timestamp),
        duration_hours: release.duration_hours.filter(|d| *d >= 0.0),
        anomalous: false,
        orphaned: true,
        reconciled: false,
        user_mismatch: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn event(
        id: u64,
        user: &str,
        spot: i64,
        action: ParkingAction,
        hour: u32,
        duration: Option<f64>,
    ) -> ParkingEvent {
        ParkingEvent {
            id,
            user_id: user.to_string(),
            spot_id: spot,
            action,
            timestamp: at(hour),
            duration_hours: duration,
        }
    }

    #[test]
    fn test_simple_pairing() {
        let events = vec![
            event(1, "U", 9, ParkingAction::Occupy, 0, None),
            event(2, "U", 9, ParkingAction::Release, 2, Some(2.0)),
        ];

        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions.len(), 1);

        let s = &sessions[0];
        assert_eq!(s.start, Some(at(0)));
        assert_eq!(s.end, Some(at(2)));
        assert_eq!(s.duration_hours, Some(2.0));
        assert!(!s.anomalous);
        assert!(!s.orphaned);
        assert!(!s.reconciled);
        assert!(!s.user_mismatch);
    }

    #[test]
    fn test_double_occupy_is_anomalous() {
        let events = vec![
            event(1, "U", 9, ParkingAction::Occupy, 0, None),
            event(2, "U", 9, ParkingAction::Occupy, 1, None),
        ];

        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions.len(), 2);

        assert!(sessions[0].anomalous);
        assert_eq!(sessions[0].end, None);
        assert_eq!(sessions[0].duration_hours, None);

        // The second occupy stays open, not anomalous
        assert!(!sessions[1].anomalous);
        assert_eq!(sessions[1].start, Some(at(1)));
        assert_eq!(sessions[1].end, None);
    }

    #[test]
    fn test_lone_release_is_orphaned() {
        let events = vec![event(1, "U", 9, ParkingAction::Release, 5, None)];

        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].orphaned);
        assert_eq!(sessions[0].start, None);
        assert_eq!(sessions[0].end, Some(at(5)));
    }

    #[test]
    fn test_orphan_uses_declared_duration() {
        let events = vec![event(1, "U", 9, ParkingAction::Release, 5, Some(1.5))];

        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions[0].duration_hours, Some(1.5));

        // A negative declared duration is never usable
        let events = vec![event(1, "U", 9, ParkingAction::Release, 5, Some(-1.0))];
        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions[0].duration_hours, None);
    }

    #[test]
    fn test_declared_duration_is_reconciled() {
        // Timestamps imply 2 hours but the release declares 5
        let events = vec![
            event(1, "U", 9, ParkingAction::Occupy, 0, None),
            event(2, "U", 9, ParkingAction::Release, 2, Some(5.0)),
        ];

        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions[0].duration_hours, Some(2.0));
        assert!(sessions[0].reconciled);
    }

    #[test]
    fn test_agreeing_declared_duration_not_reconciled() {
        let events = vec![
            event(1, "U", 9, ParkingAction::Occupy, 0, None),
            event(2, "U", 9, ParkingAction::Release, 2, Some(2.0)),
        ];

        let sessions = reconstruct_sessions(&events);
        assert!(!sessions[0].reconciled);
    }

    #[test]
    fn test_release_by_other_user_sets_mismatch() {
        let events = vec![
            event(1, "alice", 9, ParkingAction::Occupy, 0, None),
            event(2, "bob", 9, ParkingAction::Release, 1, None),
        ];

        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].user_mismatch);
        // The session belongs to the occupying user
        assert_eq!(sessions[0].user_id.as_deref(), Some("alice"));
        assert_eq!(sessions[0].duration_hours, Some(1.0));
    }

    #[test]
    fn test_negative_derived_duration_flagged() {
        // Scan order handed over directly, release timestamped before
        // its occupy
        let occupy = event(1, "U", 9, ParkingAction::Occupy, 5, None);
        let release = event(2, "U", 9, ParkingAction::Release, 2, None);
        let ordered: Vec<&ParkingEvent> = vec![&occupy, &release];

        let sessions = sessions_for_spot(9, &ordered);
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].anomalous);
        assert_eq!(sessions[0].duration_hours, None);
    }

    #[test]
    fn test_spots_are_independent() {
        let events = vec![
            event(1, "U", 1, ParkingAction::Occupy, 0, None),
            event(2, "V", 2, ParkingAction::Occupy, 0, None),
            event(3, "U", 1, ParkingAction::Release, 1, None),
            event(4, "V", 2, ParkingAction::Release, 3, None),
        ];

        let sessions = reconstruct_sessions(&events);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].spot_id, 1);
        assert_eq!(sessions[0].duration_hours, Some(1.0));
        assert_eq!(sessions[1].spot_id, 2);
        assert_eq!(sessions[1].duration_hours, Some(3.0));
    }

    #[test]
    fn test_every_event_accounted_for() {
        // Mixed log: pair, orphan, double occupy, trailing open
        let events = vec![
            event(1, "U", 1, ParkingAction::Occupy, 0, None),
            event(2, "U", 1, ParkingAction::Release, 1, None),
            event(3, "V", 1, ParkingAction::Release, 2, None),
            event(4, "W", 2, ParkingAction::Occupy, 3, None),
            event(5, "W", 2, ParkingAction::Occupy, 4, None),
        ];

        let sessions = reconstruct_sessions(&events);
        // pair + orphan + anomalous + open
        assert_eq!(sessions.len(), 4);

        let event_slots: usize = sessions
            .iter()
            .map(|s| s.start.iter().count() + s.end.iter().count())
            .sum();
        assert_eq!(event_slots, events.len());
    }

    #[test]
    fn test_fractional_hours() {
        let occupy = ParkingEvent {
            id: 1,
            user_id: "U".to_string(),
            spot_id: 9,
            action: ParkingAction::Occupy,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
            duration_hours: None,
        };
        let release = ParkingEvent {
            id: 2,
            user_id: "U".to_string(),
            spot_id: 9,
            action: ParkingAction::Release,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap(),
            duration_hours: None,
        };

        let sessions = reconstruct_sessions(&[occupy, release]);
        assert_eq!(sessions[0].duration_hours, Some(0.5));
    }
}
