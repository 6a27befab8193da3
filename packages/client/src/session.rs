//! WebSocket client session management.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relay_server::infrastructure::dto::websocket::{EventMessage, decode_event};
use serde_json::Value;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    domain::{PeerEvent, classify_incoming},
    error::ClientError,
    handler::PeerEventHandler,
};

/// How long `disconnect` waits for the relay to acknowledge the close.
const CLOSE_WAIT: Duration = Duration::from_secs(2);

/// A joined participant in a relay session.
///
/// Outbound frames go through an unbounded channel drained by a writer task,
/// so `send_state` never blocks. Inbound frames are decoded on a reader task
/// and dispatched to the handler.
pub struct PresenceClient {
    participant_id: String,
    outbound: mpsc::UnboundedSender<Message>,
    handler: Arc<dyn PeerEventHandler>,
    read_task: JoinHandle<()>,
    write_task: JoinHandle<()>,
}

impl PresenceClient {
    /// Connect to the relay and announce ourselves with a `join`.
    ///
    /// The `join` is queued before any other frame, so it always precedes
    /// updates sent through [`send_state`](Self::send_state). `on_connect`
    /// fires before any peer callback.
    pub async fn connect<H: PeerEventHandler>(
        server_url: &str,
        participant_id: &str,
        username: &str,
        initial_state: Value,
        handler: Arc<H>,
    ) -> Result<Self, ClientError> {
        let handler: Arc<dyn PeerEventHandler> = handler;
        ensure_object(&initial_state)?;

        let (ws_stream, _response) = connect_async(server_url)
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        tracing::info!("Connected to relay at {}", server_url);

        let (mut write, mut read) = ws_stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

        let join = EventMessage::Join {
            id: participant_id.to_string(),
            username: username.to_string(),
            state: initial_state,
        };
        outbound
            .send(encode(&join)?)
            .map_err(|_| ClientError::NotConnected)?;

        let write_task = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = write.send(message).await {
                    tracing::warn!("Failed to send message: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        handler.on_connect();

        let own_id = participant_id.to_string();
        let read_handler = Arc::clone(&handler);
        let read_task = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match decode_event(&text) {
                        Ok(event) => {
                            if let Some(peer_event) = classify_incoming(&own_id, event) {
                                dispatch(read_handler.as_ref(), peer_event);
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Dropping undecodable frame: {}", e);
                        }
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("Relay closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        read_handler.on_error(&ClientError::ConnectionError(e.to_string()));
                        break;
                    }
                    _ => {}
                }
            }
            read_handler.on_disconnect();
        });

        Ok(Self {
            participant_id: participant_id.to_string(),
            outbound,
            handler,
            read_task,
            write_task,
        })
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Whether the connection is still usable for sending.
    pub fn is_connected(&self) -> bool {
        !self.write_task.is_finished() && !self.read_task.is_finished()
    }

    /// Publish a new state for this participant.
    ///
    /// The state must be a JSON object; the relay drops anything else.
    pub fn send_state(&self, state: Value) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        ensure_object(&state)?;

        let update = EventMessage::Update {
            id: self.participant_id.clone(),
            state,
        };
        self.outbound
            .send(encode(&update)?)
            .map_err(|_| ClientError::NotConnected)
    }

    /// Send `leave` for our own id, then close the connection.
    ///
    /// `on_disconnect` fires exactly once, either from the reader when the
    /// relay acknowledges the close or here if it does not within a short
    /// grace period.
    pub async fn disconnect(self) -> Result<(), ClientError> {
        let Self {
            participant_id,
            outbound,
            handler,
            mut read_task,
            write_task,
        } = self;

        let leave = EventMessage::Leave { id: participant_id };
        // Either send failing means the writer is gone and the socket is already closed.
        let _ = outbound.send(encode(&leave)?);
        let _ = outbound.send(Message::Close(None));
        drop(outbound);

        let _ = write_task.await;

        if tokio::time::timeout(CLOSE_WAIT, &mut read_task)
            .await
            .is_err()
        {
            tracing::warn!("Relay did not acknowledge close; dropping connection");
            read_task.abort();
            handler.on_disconnect();
        }

        Ok(())
    }
}

fn ensure_object(state: &Value) -> Result<(), ClientError> {
    if state.is_object() {
        Ok(())
    } else {
        Err(ClientError::InvalidState(state.to_string()))
    }
}

fn encode(event: &EventMessage) -> Result<Message, ClientError> {
    let json = event
        .to_json()
        .map_err(|e| ClientError::EncodeError(e.to_string()))?;
    Ok(Message::Text(json.into()))
}

fn dispatch(handler: &dyn PeerEventHandler, event: PeerEvent) {
    match event {
        PeerEvent::Join {
            id,
            username,
            state,
        } => handler.on_peer_join(&id, &username, &state),
        PeerEvent::Update { id, state } => handler.on_peer_update(&id, &state),
        PeerEvent::Leave { id } => handler.on_peer_leave(&id),
    }
}
