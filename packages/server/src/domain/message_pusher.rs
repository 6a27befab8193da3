//! MessagePusher trait 定義
//!
//! 接続中のコネクション集合（live set）の管理と、イベントの送信を抽象化します。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, ParticipantId, PresenceEvent};

/// Outbound channel of one connection. Sends never block.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Result of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Connections the event was handed to
    pub delivered: Vec<ConnectionId>,
    /// Connections whose channel was closed; they are marked failed
    pub failed: Vec<ConnectionId>,
}

/// MessagePusher trait
///
/// コネクションごとのレコードは、最初の `join` で参加者 ID と紐付けられる。
/// この紐付けが切断時のレジストリ削除に使われる唯一の情報源となる。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// コネクションを OPEN として live set に登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// コネクションを live set から削除し、紐付いていた参加者 ID を返す
    async fn unregister_connection(&self, connection_id: ConnectionId) -> Option<ParticipantId>;

    /// コネクションに参加者 ID を紐付ける
    async fn bind_participant(
        &self,
        connection_id: ConnectionId,
        participant_id: ParticipantId,
    ) -> Result<(), MessagePushError>;

    /// コネクションに紐付いた参加者 ID（未 join なら `None`）
    ///
    /// コネクションが live set に存在しない場合は `ConnectionNotFound`
    async fn bound_participant(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<ParticipantId>, MessagePushError>;

    /// 特定のコネクションにイベントを送信
    async fn push_to(
        &self,
        connection_id: ConnectionId,
        event: &PresenceEvent,
    ) -> Result<(), MessagePushError>;

    /// `exclude` 以外の全ての OPEN コネクションにイベントを送信
    ///
    /// 一部の送信失敗は許容し、残りへの配信を続ける
    async fn broadcast(
        &self,
        exclude: Option<ConnectionId>,
        event: &PresenceEvent,
    ) -> BroadcastOutcome;

    /// OPEN 状態のコネクション数
    async fn count_open_connections(&self) -> usize;
}
