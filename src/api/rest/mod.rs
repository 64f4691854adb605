//! REST API module
//!
//! Endpoints, mapped 1:1 to the core operations:
//! - `POST /api/track-parking` - ingest an occupy/release event
//! - `GET /api/analytics/popular-spots` - top spots by session count
//! - `GET /api/analytics/frequent-users` - top users by session count
//! - `GET /api/analytics/usage-stats` - overall usage statistics
//! - `GET /api/analytics/dashboard` - the three above from one snapshot

pub mod analytics;
pub mod events;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::DEFAULT_TOP_LIMIT;
use crate::types::Window;

/// Query parameters shared by the analytics endpoints
#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    /// Maximum number of ranked rows to return (default: 10, max: 100)
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Window lower bound (inclusive), RFC 3339
    pub from: Option<DateTime<Utc>>,
    /// Window upper bound (exclusive), RFC 3339
    pub to: Option<DateTime<Utc>>,
}

fn default_limit() -> usize {
    DEFAULT_TOP_LIMIT
}

impl AnalyticsParams {
    /// Normalize limit to max 100
    pub fn normalized_limit(&self) -> usize {
        self.limit.min(100)
    }

    /// The requested aggregation window
    pub fn window(&self) -> Window {
        Window {
            from: self.from,
            to: self.to,
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "VALIDATION_ERROR".to_string(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "STORAGE_UNAVAILABLE".to_string(),
        }
    }
}
