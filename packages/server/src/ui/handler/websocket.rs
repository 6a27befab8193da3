//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::Response,
};
use futures_util::{
    sink::{Sink, SinkExt},
    stream::{Stream, StreamExt},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ConnectionId, PresenceEvent},
    infrastructure::dto::websocket::decode_event,
    ui::{error::ProtocolError, state::AppState},
    usecase::{DisconnectReason, RelayError},
};

pub async fn websocket_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ProtocolError> {
    let ws = ws.map_err(|rejection| {
        tracing::warn!("Rejected non-upgrade request to relay path: {}", rejection);
        ProtocolError(rejection.body_text())
    })?;

    let connection_id = ConnectionId::generate();
    tracing::debug!("Upgrading connection '{}'", connection_id);

    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade failed for '{}': {}", connection_id, e);
        })
        .on_upgrade(move |socket| handle_socket(socket, state, connection_id)))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Each frame must be written within `send_timeout`; a stalled peer ends its
/// own connection instead of holding up anyone else.
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop<S>(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: S,
    send_timeout: Duration,
    connection_id: ConnectionId,
) -> tokio::task::JoinHandle<DisconnectReason>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: std::fmt::Display,
{
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match tokio::time::timeout(send_timeout, sender.send(Message::Text(msg.into()))).await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return DisconnectReason::Errored(e.to_string()),
                Err(_) => {
                    tracing::warn!(
                        "Send to '{}' timed out after {:?}",
                        connection_id,
                        send_timeout
                    );
                    return DisconnectReason::Errored("send timed out".to_string());
                }
            }
        }
        DisconnectReason::Closed
    })
}

/// Reads frames from the client and relays each decoded event.
///
/// Malformed frames are logged and dropped; the connection stays open.
/// `shutdown` is only observed between frames, so an event already handed
/// to the relay always completes.
async fn receive_loop<R>(
    mut receiver: R,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    shutdown: CancellationToken,
) -> DisconnectReason
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            biased;
            () = shutdown.cancelled() => return DisconnectReason::Closed,
            msg = receiver.next() => msg,
        };
        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                return DisconnectReason::Errored(e.to_string());
            }
            None => return DisconnectReason::Closed,
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received from '{}': {}", connection_id, text.as_str());

                let event = match decode_event(text.as_str()).and_then(PresenceEvent::try_from) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Dropping message from '{}': {}", connection_id, e);
                        continue;
                    }
                };

                match state
                    .relay_event_usecase
                    .execute(connection_id, event)
                    .await
                {
                    Ok(_) => {}
                    Err(RelayError::ConnectionClosed(e)) => {
                        tracing::debug!("Stopping dispatch for '{}': {}", connection_id, e);
                        return DisconnectReason::Closed;
                    }
                    Err(e) => {
                        tracing::warn!("Dropping event from '{}': {}", connection_id, e);
                    }
                }
            }
            Message::Binary(data) => {
                tracing::debug!(
                    "Ignoring {} byte binary frame from '{}'",
                    data.len(),
                    connection_id
                );
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                return DisconnectReason::Closed;
            }
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, receiver) = socket.split();
    serve_connection(sender, receiver, state, connection_id).await;
}

/// Runs one accepted connection from registration to disconnect cleanup.
async fn serve_connection<S, R>(
    sender: S,
    receiver: R,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: std::fmt::Display,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    // Create a channel for this connection to receive relayed events
    let (tx, rx) = mpsc::unbounded_channel();

    // Register in the live set and queue the catch-up snapshot
    match state
        .connect_participant_usecase
        .execute(connection_id, tx)
        .await
    {
        Ok(catch_up) => {
            tracing::info!(
                "Connection '{}' opened; sent {} catch-up join(s)",
                connection_id,
                catch_up.len()
            );
        }
        Err(e) => {
            tracing::warn!("Failed to open connection '{}': {}", connection_id, e);
            return;
        }
    }

    let shutdown = CancellationToken::new();
    let mut send_task = pusher_loop(rx, sender, state.send_timeout, connection_id);
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        connection_id,
        shutdown.clone(),
    ));

    // Whichever side finishes first ends the connection. The reader is
    // cancelled between frames; the writer has nothing left to finish.
    let reason = tokio::select! {
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or_else(|e| DisconnectReason::Errored(e.to_string()))
        }
        result = &mut send_task => {
            shutdown.cancel();
            if let Err(e) = recv_task.await {
                tracing::warn!("Reader for '{}' ended abnormally: {}", connection_id, e);
            }
            result.unwrap_or_else(|e| DisconnectReason::Errored(e.to_string()))
        }
    };

    let outcome = state
        .disconnect_participant_usecase
        .execute(connection_id, reason)
        .await;
    match outcome.participant_id {
        Some(participant_id) => tracing::info!(
            "Connection '{}' ({}) closed and removed from registry",
            connection_id,
            participant_id
        ),
        None => tracing::info!("Connection '{}' closed", connection_id),
    }
}
