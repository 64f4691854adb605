//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use super::graphql;
use super::rest::{analytics, events};
use super::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - the analytics dashboard is a browser client
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let schema = graphql::build_schema(state.clone());

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Event ingestion
        .route("/api/track-parking", post(events::track_parking))
        // Analytics endpoints
        .route("/api/analytics/popular-spots", get(analytics::popular_spots))
        .route("/api/analytics/frequent-users", get(analytics::frequent_users))
        .route("/api/analytics/usage-stats", get(analytics::usage_stats))
        .route("/api/analytics/dashboard", get(analytics::dashboard))
        // GraphQL endpoint + playground
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .layer(Extension(schema))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "parking-analytics",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let store = Arc::new(EventStore::in_memory());
        let state = Arc::new(AppState::new(store));
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }
}
