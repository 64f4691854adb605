//! Event ingestion endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::ApiError;
use crate::api::AppState;
use crate::event_store::EventStoreError;
use crate::types::NewEventInput;

/// POST /api/track-parking - Track a parking-spot event
///
/// Returns 201 with the stored record, including its assigned id and
/// timestamp. Structural validation only; an unmatched release is accepted
/// and surfaced later by session reconstruction.
pub async fn track_parking(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewEventInput>,
) -> impl IntoResponse {
    match state.store.append(input) {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(EventStoreError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(msg))).into_response()
        }
        // A failed durable write is retryable by the caller; the store
        // does not retry internally
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::unavailable(err.to_string())),
        )
            .into_response(),
    }
}
