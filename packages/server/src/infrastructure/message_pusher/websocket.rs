//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続中コネクションのレコード（送信チャンネル、紐付いた参加者 ID、状態）の管理
//! - イベントの JSON へのシリアライズと送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、送信に使用します。
//! 送信は非ブロッキングで、遅いピアが他のピアへの配信を止めることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastOutcome, ConnectionId, MessagePushError, MessagePusher, ParticipantId,
    PresenceEvent, PusherChannel,
};
use crate::infrastructure::dto::websocket::EventMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionStatus {
    Open,
    /// A send failed; skipped by broadcasts until the connection is unregistered
    Failed,
}

/// One entry of the live set
#[derive(Debug)]
pub struct ConnectionRecord {
    sender: PusherChannel,
    participant_id: Option<ParticipantId>,
    status: ConnectionStatus,
}

impl ConnectionRecord {
    fn new(sender: PusherChannel) -> Self {
        Self {
            sender,
            participant_id: None,
            status: ConnectionStatus::Open,
        }
    }
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::default();
/// pusher.register_connection(connection_id, tx).await;
/// pusher.broadcast(Some(connection_id), &event).await;
/// ```
pub struct WebSocketMessagePusher {
    /// Key: ConnectionId, Value: ConnectionRecord
    connections: Arc<Mutex<HashMap<ConnectionId, ConnectionRecord>>>,
}

impl WebSocketMessagePusher {
    pub fn new(connections: Arc<Mutex<HashMap<ConnectionId, ConnectionRecord>>>) -> Self {
        Self { connections }
    }

    fn encode(event: &PresenceEvent) -> Result<String, MessagePushError> {
        EventMessage::from(event)
            .to_json()
            .map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, ConnectionRecord::new(sender));
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_connection(&self, connection_id: ConnectionId) -> Option<ParticipantId> {
        let mut connections = self.connections.lock().await;
        let record = connections.remove(&connection_id)?;
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
        record.participant_id
    }

    async fn bind_participant(
        &self,
        connection_id: ConnectionId,
        participant_id: ParticipantId,
    ) -> Result<(), MessagePushError> {
        let mut connections = self.connections.lock().await;
        let record = connections
            .get_mut(&connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        tracing::debug!(
            "Connection '{}' bound to participant '{}'",
            connection_id,
            participant_id
        );
        record.participant_id = Some(participant_id);
        Ok(())
    }

    async fn bound_participant(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<ParticipantId>, MessagePushError> {
        let connections = self.connections.lock().await;
        connections
            .get(&connection_id)
            .map(|record| record.participant_id.clone())
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))
    }

    async fn push_to(
        &self,
        connection_id: ConnectionId,
        event: &PresenceEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(event)?;
        let connections = self.connections.lock().await;

        let record = connections
            .get(&connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        record
            .sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!(
            "Pushed '{}' for '{}' to connection '{}'",
            event.kind(),
            event.participant_id(),
            connection_id
        );
        Ok(())
    }

    async fn broadcast(
        &self,
        exclude: Option<ConnectionId>,
        event: &PresenceEvent,
    ) -> BroadcastOutcome {
        let content = match Self::encode(event) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Dropping broadcast: {}", e);
                return BroadcastOutcome::default();
            }
        };

        let mut connections = self.connections.lock().await;
        let mut outcome = BroadcastOutcome::default();

        for (connection_id, record) in connections.iter() {
            if Some(*connection_id) == exclude || record.status != ConnectionStatus::Open {
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            match record.sender.send(content.clone()) {
                Ok(()) => outcome.delivered.push(*connection_id),
                Err(e) => {
                    tracing::warn!(
                        "Failed to push '{}' to connection '{}': {}",
                        event.kind(),
                        connection_id,
                        e
                    );
                    outcome.failed.push(*connection_id);
                }
            }
        }

        for connection_id in &outcome.failed {
            if let Some(record) = connections.get_mut(connection_id) {
                record.status = ConnectionStatus::Failed;
            }
        }

        outcome
    }

    async fn count_open_connections(&self) -> usize {
        let connections = self.connections.lock().await;
        connections
            .values()
            .filter(|record| record.status == ConnectionStatus::Open)
            .count()
    }
}
