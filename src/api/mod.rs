//! API module for the REST and GraphQL façades
//!
//! Both façades are thin adapters over the same event store and aggregation
//! engine: field selection and shape only, no business logic, so REST and
//! GraphQL consumers always see consistent numbers for the same log.

pub mod graphql;
pub mod http;
pub mod rest;

use std::sync::Arc;

use crate::analytics::AnalyticsEngine;
use crate::event_store::EventStore;

/// Shared application state for all handlers
pub struct AppState {
    /// The append-only event log
    pub store: Arc<EventStore>,
    /// Aggregation queries over the log
    pub analytics: AnalyticsEngine,
}

impl AppState {
    /// Create state around an event store
    pub fn new(store: Arc<EventStore>) -> Self {
        let analytics = AnalyticsEngine::new(store.clone());
        Self { store, analytics }
    }
}
