//! UI 層のエラー型

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// A request to the relay path that is not a valid WebSocket upgrade.
///
/// Rejected with `426 Upgrade Required`; the connection never opens.
#[derive(Debug, Error)]
#[error("WebSocket upgrade required: {0}")]
pub struct ProtocolError(pub String);

impl IntoResponse for ProtocolError {
    fn into_response(self) -> Response {
        (StatusCode::UPGRADE_REQUIRED, self.to_string()).into_response()
    }
}
