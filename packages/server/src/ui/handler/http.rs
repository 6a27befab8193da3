//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::http::{ParticipantDto, SessionStateDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get registered participants in registry order
pub async fn get_participants(State(state): State<Arc<AppState>>) -> Json<Vec<ParticipantDto>> {
    let participants = state.get_participants_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(participants.into_iter().map(ParticipantDto::from).collect())
}

/// Debug endpoint to get current session state (for testing purposes)
pub async fn debug_session_state(State(state): State<Arc<AppState>>) -> Json<SessionStateDto> {
    let overview = state.get_session_state_usecase.execute().await;

    Json(SessionStateDto {
        participants: overview
            .participants
            .into_iter()
            .map(ParticipantDto::from)
            .collect(),
        open_connections: overview.open_connections,
    })
}

/// Fallback for every unrecognized path
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not found"})),
    )
}
