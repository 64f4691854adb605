//! Event Store module
//!
//! The core write path of the service:
//!
//! ```text
//! ┌─────────┐    ┌──────────────┐    ┌─────────────────┐
//! │ REST /  │───►│ validate +   │───►│ append to       │
//! │ GraphQL │    │ assign id/ts │    │ events.jsonl    │
//! └─────────┘    └──────────────┘    └─────────────────┘
//! ```
//!
//! Reads hand out snapshot clones so sessions and analytics are always
//! derived from one consistent view of the log.

mod store;

pub use store::{EventStore, EventStoreConfig, EventStoreError, EventStoreResult};
