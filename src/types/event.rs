//! Parking event types
//!
//! This module defines the immutable event record that forms the append-only
//! log, plus the raw ingestion input that gets validated into it. Events are
//! facts about reported occupy/release actions and are never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reported action on a parking spot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, async_graphql::Enum,
)]
#[serde(rename_all = "lowercase")]
pub enum ParkingAction {
    /// A user reported occupying a spot
    #[serde(alias = "occupied")]
    Occupy,
    /// A user reported releasing a spot
    #[serde(alias = "freed")]
    Release,
}

impl ParkingAction {
    /// Parse an action from its wire spelling, accepting the legacy
    /// `occupied`/`freed` values the original deployments sent.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "occupy" | "occupied" => Some(ParkingAction::Occupy),
            "release" | "freed" => Some(ParkingAction::Release),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParkingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParkingAction::Occupy => write!(f, "occupy"),
            ParkingAction::Release => write!(f, "release"),
        }
    }
}

/// An immutable event in the parking log
///
/// Events are the source of truth. Sessions and all analytics are derived
/// by replaying events in append order.
#[derive(Debug, Clone, Serialize, Deserialize, async_graphql::SimpleObject)]
pub struct ParkingEvent {
    /// Unique, auto-incrementing event ID assigned at append time
    pub id: u64,
    /// Opaque user identifier
    pub user_id: String,
    /// Parking spot identifier
    pub spot_id: i64,
    /// Reported action
    pub action: ParkingAction,
    /// When the action occurred (server-observed when not supplied)
    pub timestamp: DateTime<Utc>,
    /// Declared duration in hours, meaningful on release events only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
}

impl ParkingEvent {
    /// Serialize to a single JSON line for the append-only log
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a single JSON line of the log
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Raw ingestion input as received from a client
///
/// All fields are optional here so that missing fields surface as a
/// validation failure with a useful message rather than a deserialization
/// rejection. The core never operates on this shape directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEventInput {
    pub user_id: Option<String>,
    pub spot_id: Option<i64>,
    pub action: Option<String>,
    /// Optional client-reported timestamp; server time is used when absent
    pub timestamp: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
}

/// A validated ingestion input, ready for the event store
#[derive(Debug, Clone)]
pub struct ValidEvent {
    pub user_id: String,
    pub spot_id: i64,
    pub action: ParkingAction,
    pub timestamp: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
}

impl NewEventInput {
    /// Validate the raw input into a typed event
    ///
    /// Checks only structure: required fields present and `action`
    /// recognizable. No business rules apply here - a release without a
    /// matching occupy is a perfectly valid event.
    pub fn validate(self) -> Result<ValidEvent, String> {
        let user_id = match self.user_id {
            Some(u) if !u.trim().is_empty() => u,
            _ => return Err("user_id, spot_id, action required".to_string()),
        };
        let spot_id = match self.spot_id {
            Some(s) => s,
            None => return Err("user_id, spot_id, action required".to_string()),
        };
        let action = match self.action.as_deref() {
            Some(a) => match ParkingAction::parse(a) {
                Some(action) => action,
                None => {
                    return Err(format!(
                        "action '{}' not recognized (expected 'occupy' or 'release')",
                        a
                    ))
                }
            },
            None => return Err("user_id, spot_id, action required".to_string()),
        };

        Ok(ValidEvent {
            user_id,
            spot_id,
            action,
            timestamp: self.timestamp,
            duration_hours: self.duration_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(user: &str, spot: i64, action: &str) -> NewEventInput {
        NewEventInput {
            user_id: Some(user.to_string()),
            spot_id: Some(spot),
            action: Some(action.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        let valid = input("u1", 9, "occupy").validate().unwrap();
        assert_eq!(valid.user_id, "u1");
        assert_eq!(valid.spot_id, 9);
        assert_eq!(valid.action, ParkingAction::Occupy);
    }

    #[test]
    fn test_validate_legacy_action_values() {
        assert_eq!(
            input("u1", 1, "occupied").validate().unwrap().action,
            ParkingAction::Occupy
        );
        assert_eq!(
            input("u1", 1, "freed").validate().unwrap().action,
            ParkingAction::Release
        );
    }

    #[test]
    fn test_validate_missing_fields() {
        let missing_user = NewEventInput {
            spot_id: Some(1),
            action: Some("occupy".to_string()),
            ..Default::default()
        };
        assert!(missing_user.validate().is_err());

        let missing_action = NewEventInput {
            user_id: Some("u1".to_string()),
            spot_id: Some(1),
            ..Default::default()
        };
        assert!(missing_action.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_action() {
        let err = input("u1", 1, "parked").validate().unwrap_err();
        assert!(err.contains("parked"));
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = ParkingEvent {
            id: 1,
            user_id: "u1".to_string(),
            spot_id: 9,
            action: ParkingAction::Release,
            timestamp: Utc::now(),
            duration_hours: Some(1.5),
        };

        let line = event.to_json_line().unwrap();
        let parsed = ParkingEvent::from_json_line(&line).unwrap();
        assert_eq!(parsed.id, 1);
        assert_eq!(parsed.action, ParkingAction::Release);
        assert_eq!(parsed.duration_hours, Some(1.5));
    }

    #[test]
    fn test_event_deserializes_legacy_wire_format() {
        let line = r#"{"id":3,"user_id":"u","spot_id":2,"action":"freed","timestamp":"2025-06-01T10:00:00Z","duration_hours":2.0}"#;
        let event = ParkingEvent::from_json_line(line).unwrap();
        assert_eq!(event.action, ParkingAction::Release);
    }
}
