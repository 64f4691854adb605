//! Event Store - append-only parking event log
//!
//! The EventStore owns event identity and storage order. Appends are
//! serialized and durable; reads hand out snapshot clones of the ordered
//! log so queries never block writers.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;

use crate::types::{NewEventInput, ParkingEvent, ValidEvent};

/// Configuration for the EventStore
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Path to the data directory
    pub data_dir: PathBuf,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl EventStoreConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Get path to events.jsonl
    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("events.jsonl")
    }
}

/// Result type for EventStore operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Errors that can occur in EventStore operations
#[derive(Debug)]
pub enum EventStoreError {
    /// The store cannot durably read or write; retryable by the caller
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Malformed ingestion input (missing or invalid required field)
    Validation(String),
}

impl std::fmt::Display for EventStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStoreError::Io(e) => write!(f, "storage unavailable: {}", e),
            EventStoreError::Json(e) => write!(f, "JSON error: {}", e),
            EventStoreError::Validation(msg) => write!(f, "invalid event: {}", msg),
        }
    }
}

impl std::error::Error for EventStoreError {}

impl From<std::io::Error> for EventStoreError {
    fn from(e: std::io::Error) -> Self {
        EventStoreError::Io(e)
    }
}

impl From<serde_json::Error> for EventStoreError {
    fn from(e: serde_json::Error) -> Self {
        EventStoreError::Json(e)
    }
}

/// Mutable state guarded by the store's lock
struct StoreInner {
    /// Events in append order (stable, total order)
    events: Vec<ParkingEvent>,
    /// Next event ID to assign
    next_id: u64,
}

/// The EventStore manages the append-only parking event log
///
/// Appends take the write lock for the whole id-assignment + durable-write
/// unit, so each append is atomic relative to every other append and every
/// read. Reads clone the event list under the read lock, giving each query
/// one consistent snapshot.
pub struct EventStore {
    /// None for an in-memory store (tests); Some for a durable one
    config: Option<EventStoreConfig>,
    inner: RwLock<StoreInner>,
}

impl EventStore {
    /// Create an in-memory store with no durable backing
    pub fn in_memory() -> Self {
        Self {
            config: None,
            inner: RwLock::new(StoreInner {
                events: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Open a durable store, replaying any existing event log
    ///
    /// Unparsable lines are skipped with a warning so one corrupt line
    /// never takes the whole log down with it.
    pub fn open(config: EventStoreConfig) -> EventStoreResult<Self> {
        let events = Self::load_events(&config)?;
        let next_id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        Ok(Self {
            config: Some(config),
            inner: RwLock::new(StoreInner { events, next_id }),
        })
    }

    fn load_events(config: &EventStoreConfig) -> EventStoreResult<Vec<ParkingEvent>> {
        let events_path = config.events_path();

        if !events_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&events_path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match ParkingEvent::from_json_line(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse event at line {}: {}",
                        line_num + 1,
                        e
                    );
                    // Continue loading other events
                }
            }
        }

        Ok(events)
    }

    /// Append a new event to the log
    ///
    /// Validates the input, assigns the next id, fills in a server-observed
    /// timestamp when none was supplied (clamped so assigned timestamps
    /// never run backwards), writes the event durably, and returns the
    /// stored record. No business rules apply: an unmatched release is
    /// stored like any other fact.
    pub fn append(&self, input: NewEventInput) -> EventStoreResult<ParkingEvent> {
        let valid = input.validate().map_err(EventStoreError::Validation)?;

        let mut inner = self.inner.write();
        let event = self.build_event(&inner, valid);

        // Durable write before the event becomes visible to readers
        if let Some(config) = &self.config {
            Self::write_line(config, &event)?;
        }

        inner.next_id = event.id + 1;
        inner.events.push(event.clone());

        Ok(event)
    }

    fn build_event(&self, inner: &StoreInner, valid: ValidEvent) -> ParkingEvent {
        let timestamp = match valid.timestamp {
            // Client-reported timestamps are recorded as given
            Some(ts) => ts,
            // Server-observed timestamps never run backwards
            None => {
                let now = Utc::now();
                match inner.events.last() {
                    Some(tail) if tail.timestamp > now => tail.timestamp,
                    _ => now,
                }
            }
        };

        ParkingEvent {
            id: inner.next_id,
            user_id: valid.user_id,
            spot_id: valid.spot_id,
            action: valid.action,
            timestamp,
            duration_hours: valid.duration_hours,
        }
    }

    fn write_line(config: &EventStoreConfig, event: &ParkingEvent) -> EventStoreResult<()> {
        let events_path = config.events_path();

        if let Some(parent) = events_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&events_path)?;

        let json_line = event.to_json_line()?;
        writeln!(file, "{}", json_line)?;

        // Sync to disk for durability
        file.sync_all()?;

        Ok(())
    }

    /// All events in append order (a snapshot clone)
    pub fn list_all(&self) -> Vec<ParkingEvent> {
        self.inner.read().events.clone()
    }

    /// Events for one spot, append order preserved
    pub fn list_by_spot(&self, spot_id: i64) -> Vec<ParkingEvent> {
        self.inner
            .read()
            .events
            .iter()
            .filter(|e| e.spot_id == spot_id)
            .cloned()
            .collect()
    }

    /// Events for one user, append order preserved
    pub fn list_by_user(&self, user_id: &str) -> Vec<ParkingEvent> {
        self.inner
            .read()
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Whether any event mentions this user
    pub fn has_user(&self, user_id: &str) -> bool {
        self.inner.read().events.iter().any(|e| e.user_id == user_id)
    }

    /// Whether any event mentions this spot
    pub fn has_spot(&self, spot_id: i64) -> bool {
        self.inner.read().events.iter().any(|e| e.spot_id == spot_id)
    }

    /// Number of events in the log
    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().events.is_empty()
    }
}
