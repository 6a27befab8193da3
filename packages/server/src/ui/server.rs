//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{any, get},
};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetParticipantsUseCase,
    GetSessionStateUseCase, RelayEventUseCase,
};

use super::{
    handler::{
        http::{debug_session_state, get_participants, health_check, not_found},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Path clients upgrade on
pub const RELAY_PATH: &str = "/ws";

/// Tunables for the relay server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Per-frame timeout for writes to one client socket
    pub send_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(5),
        }
    }
}

/// Presence relay server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_participant_usecase,
///     relay_event_usecase,
///     disconnect_participant_usecase,
///     get_participants_usecase,
///     get_session_state_usecase,
///     ServerConfig::default(),
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    relay_event_usecase: Arc<RelayEventUseCase>,
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    get_participants_usecase: Arc<GetParticipantsUseCase>,
    get_session_state_usecase: Arc<GetSessionStateUseCase>,
    config: ServerConfig,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        relay_event_usecase: Arc<RelayEventUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        get_participants_usecase: Arc<GetParticipantsUseCase>,
        get_session_state_usecase: Arc<GetSessionStateUseCase>,
        config: ServerConfig,
    ) -> Self {
        Self {
            connect_participant_usecase,
            relay_event_usecase,
            disconnect_participant_usecase,
            get_participants_usecase,
            get_session_state_usecase,
            config,
        }
    }

    /// Build the axum router without binding a listener
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_participant_usecase: self.connect_participant_usecase,
            relay_event_usecase: self.relay_event_usecase,
            disconnect_participant_usecase: self.disconnect_participant_usecase,
            get_participants_usecase: self.get_participants_usecase,
            get_session_state_usecase: self.get_session_state_usecase,
            send_timeout: self.config.send_timeout,
        });

        Router::new()
            // WebSocket エンドポイント
            .route(RELAY_PATH, any(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/participants", get(get_participants))
            .route("/debug/session", get(debug_session_state))
            .fallback(not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Presence relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}{}", bind_addr, RELAY_PATH);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
