//! Analytics endpoints
//!
//! Thin adapters over the aggregation engine: each handler parses the query
//! parameters, delegates, and wraps the result in the response shape the
//! original dashboard consumers expect.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use super::AnalyticsParams;
use crate::analytics::{Dashboard, SpotUsage, UserActivity};
use crate::api::AppState;

/// Response for GET /api/analytics/popular-spots
#[derive(Debug, Serialize)]
pub struct PopularSpotsResponse {
    pub popular_spots: Vec<SpotUsage>,
}

/// GET /api/analytics/popular-spots - Top spots by session count
pub async fn popular_spots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> impl IntoResponse {
    let popular_spots = state
        .analytics
        .popular_spots(params.normalized_limit(), &params.window());
    Json(PopularSpotsResponse { popular_spots })
}

/// Response for GET /api/analytics/frequent-users
#[derive(Debug, Serialize)]
pub struct FrequentUsersResponse {
    pub frequent_users: Vec<UserActivity>,
}

/// GET /api/analytics/frequent-users - Top users by parking sessions
pub async fn frequent_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> impl IntoResponse {
    let frequent_users = state
        .analytics
        .frequent_users(params.normalized_limit(), &params.window());
    Json(FrequentUsersResponse { frequent_users })
}

/// GET /api/analytics/usage-stats - Overall usage statistics
pub async fn usage_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> impl IntoResponse {
    Json(state.analytics.usage_stats(&params.window()))
}

/// Response for GET /api/analytics/dashboard
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dashboard: Dashboard,
}

/// GET /api/analytics/dashboard - All analytics from one snapshot
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> impl IntoResponse {
    let dashboard = state
        .analytics
        .dashboard(params.normalized_limit(), &params.window());
    Json(DashboardResponse { dashboard })
}
