//! Parking Analytics Service
//!
//! Records discrete parking-occupancy events and answers aggregate
//! analytical queries over the accumulated log, served over two façades -
//! a REST API and a GraphQL schema - backed by one shared event store and
//! aggregation layer.
//!
//! # Modules
//!
//! - `types`: Core data structures (ParkingEvent, Session, Window)
//! - `event_store`: Append-only durable event log
//! - `sessions`: Session reconstruction from paired occupy/release events
//! - `analytics`: Popularity, frequency and usage-statistics queries
//! - `api`: REST and GraphQL façades over the core
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use parking_analytics::api::{http::create_router, AppState};
//! use parking_analytics::event_store::{EventStore, EventStoreConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(EventStore::open(EventStoreConfig::new("data")).unwrap());
//!     let app = create_router(Arc::new(AppState::new(store)));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod event_store;
pub mod sessions;
pub mod types;

// Re-export commonly used items at crate root
pub use analytics::{AnalyticsEngine, Dashboard, SpotUsage, UsageStats, UserActivity};
pub use event_store::{EventStore, EventStoreConfig, EventStoreError, EventStoreResult};
pub use sessions::reconstruct_sessions;
pub use types::{NewEventInput, ParkingAction, ParkingEvent, Session, Window};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
