//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{domain::Room, ui::state::AppState};

/// Debug endpoint to get current room state (for testing purposes)
pub async fn debug_room_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Room>, StatusCode> {
    match state.get_room_state_usecase.execute().await {
        Ok(room) => Ok(Json(room)),
        Err(e) => {
            tracing::error!("Failed to get room state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
