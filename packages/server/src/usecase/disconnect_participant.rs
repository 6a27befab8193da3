//! UseCase: コネクション切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - live set からの削除、レジストリからの削除、leave のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 切断した参加者がレジストリに残らないことを保証
//! - 残りの全コネクションに leave が一度だけ届くことを確認
//! - エラーによる切断も正常な切断と同じ後処理になることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：join 済みコネクションの切断
//! - エッジケース：join 前に切断したコネクション（通知なし）、二重の切断処理
//! - 異常系：トランスポートエラーによる切断

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, ParticipantId, PresenceEvent, SessionRepository};

use super::sequencer::EventSequencer;

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Close frame received or the stream ended
    Closed,
    /// Transport error on either direction
    Errored(String),
}

/// 切断処理の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// The participant the connection was bound to, if it ever joined
    pub participant_id: Option<ParticipantId>,
    /// Connections that were sent the `leave`
    pub notified: Vec<ConnectionId>,
}

/// コネクション切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（セッションレジストリの抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（live set とメッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<EventSequencer>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<EventSequencer>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
        }
    }

    /// コネクション切断を実行
    ///
    /// 正常な切断とエラーによる切断は同じ扱いとなる：live set から削除し、
    /// join 済みであればレジストリから削除して残りのコネクションに `leave` を送る。
    /// 参加者 ID は join 時にコネクションに記録されたものだけを使う。
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        reason: DisconnectReason,
    ) -> DisconnectOutcome {
        let _guard = self.sequencer.enter().await;

        // 1. live set から削除（紐付いた参加者 ID を取得）
        let Some(participant_id) = self
            .message_pusher
            .unregister_connection(connection_id)
            .await
        else {
            tracing::debug!(
                "Connection '{}' closed before joining ({:?})",
                connection_id,
                reason
            );
            return DisconnectOutcome::default();
        };

        // 2. レジストリから削除
        self.repository.remove(&participant_id).await;

        // 3. 残りのコネクションに leave をブロードキャスト
        let event = PresenceEvent::Leave {
            id: participant_id.clone(),
        };
        let outcome = self.message_pusher.broadcast(None, &event).await;
        tracing::info!(
            "Participant '{}' left ({:?}); notified {} connection(s)",
            participant_id,
            reason,
            outcome.delivered.len()
        );

        DisconnectOutcome {
            participant_id: Some(participant_id),
            notified: outcome.delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use relay_shared::time::FixedClock;
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{ParticipantState, Username},
        infrastructure::{
            dto::websocket::{EventMessage, decode_event},
            message_pusher::WebSocketMessagePusher,
            repository::InMemorySessionRepository,
        },
        usecase::RelayEventUseCase,
    };

    struct Fixture {
        relay: RelayEventUseCase,
        usecase: DisconnectParticipantUseCase,
        repository: Arc<InMemorySessionRepository>,
        pusher: Arc<WebSocketMessagePusher>,
    }

    fn create_fixture() -> Fixture {
        let repository = Arc::new(InMemorySessionRepository::default());
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let sequencer = Arc::new(EventSequencer::new());
        Fixture {
            relay: RelayEventUseCase::new(
                repository.clone(),
                pusher.clone(),
                sequencer.clone(),
                Arc::new(FixedClock::new(1000)),
            ),
            usecase: DisconnectParticipantUseCase::new(
                repository.clone(),
                pusher.clone(),
                sequencer,
            ),
            repository,
            pusher,
        }
    }

    async fn connect_and_join(
        f: &Fixture,
        id: Option<&str>,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        f.pusher.register_connection(connection_id, tx).await;
        if let Some(id) = id {
            f.relay
                .execute(
                    connection_id,
                    PresenceEvent::Join {
                        id: ParticipantId::new(id.to_string()).unwrap(),
                        username: Username::new(id.to_string()),
                        state: ParticipantState::new(json!({})),
                    },
                )
                .await
                .unwrap();
        }
        (connection_id, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) {
        while rx.try_recv().is_ok() {}
    }

    #[tokio::test]
    async fn test_disconnect_removes_participant_and_broadcasts_leave() {
        // テスト項目: 切断すると参加者がレジストリから削除され、残りの全員に leave が届く
        // given (前提条件):
        let f = create_fixture();
        let (p1_conn, mut p1_rx) = connect_and_join(&f, Some("p1")).await;
        let (p2_conn, _p2_rx) = connect_and_join(&f, Some("p2")).await;
        let (p3_conn, mut p3_rx) = connect_and_join(&f, Some("p3")).await;
        drain(&mut p1_rx);
        drain(&mut p3_rx);

        // when (操作):
        let outcome = f.usecase.execute(p2_conn, DisconnectReason::Closed).await;

        // then (期待する結果):
        assert_eq!(
            outcome.participant_id,
            Some(ParticipantId::new("p2".to_string()).unwrap())
        );
        assert_eq!(outcome.notified.len(), 2);
        assert!(outcome.notified.contains(&p1_conn));
        assert!(outcome.notified.contains(&p3_conn));
        let expected = EventMessage::Leave {
            id: "p2".to_string(),
        };
        assert_eq!(decode_event(&p1_rx.recv().await.unwrap()).unwrap(), expected);
        assert_eq!(decode_event(&p3_rx.recv().await.unwrap()).unwrap(), expected);
        let ids: Vec<String> = f
            .repository
            .snapshot()
            .await
            .into_iter()
            .map(|p| p.id.into_string())
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn test_error_disconnect_behaves_like_close() {
        // テスト項目: エラーによる切断でもレジストリ削除と leave のブロードキャストが行われる
        // given (前提条件):
        let f = create_fixture();
        let (_p1_conn, mut p1_rx) = connect_and_join(&f, Some("p1")).await;
        let (p2_conn, _p2_rx) = connect_and_join(&f, Some("p2")).await;
        drain(&mut p1_rx);

        // when (操作):
        let outcome = f
            .usecase
            .execute(p2_conn, DisconnectReason::Errored("reset by peer".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(outcome.notified.len(), 1);
        assert_eq!(
            decode_event(&p1_rx.recv().await.unwrap()).unwrap(),
            EventMessage::Leave {
                id: "p2".to_string()
            }
        );
        assert_eq!(f.repository.count_participants().await, 1);
        assert_eq!(f.pusher.count_open_connections().await, 1);
    }

    #[tokio::test]
    async fn test_disconnect_before_join_is_silent() {
        // テスト項目: join 前に切断したコネクションでは何もブロードキャストされない
        // given (前提条件):
        let f = create_fixture();
        let (_p1_conn, mut p1_rx) = connect_and_join(&f, Some("p1")).await;
        let (lurker, _lurker_rx) = connect_and_join(&f, None).await;
        drain(&mut p1_rx);

        // when (操作):
        let outcome = f.usecase.execute(lurker, DisconnectReason::Closed).await;

        // then (期待する結果):
        assert_eq!(outcome, DisconnectOutcome::default());
        assert!(p1_rx.try_recv().is_err());
        assert_eq!(f.repository.count_participants().await, 1);
    }

    #[tokio::test]
    async fn test_second_disconnect_is_noop() {
        // テスト項目: 同じコネクションの二重切断処理では leave は一度しか送られない
        // given (前提条件):
        let f = create_fixture();
        let (_p1_conn, mut p1_rx) = connect_and_join(&f, Some("p1")).await;
        let (p2_conn, _p2_rx) = connect_and_join(&f, Some("p2")).await;
        drain(&mut p1_rx);
        f.usecase.execute(p2_conn, DisconnectReason::Closed).await;

        // when (操作):
        let second = f.usecase.execute(p2_conn, DisconnectReason::Closed).await;

        // then (期待する結果):
        assert_eq!(second, DisconnectOutcome::default());
        assert!(p1_rx.recv().await.is_some());
        assert!(p1_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closing_older_duplicate_removes_shared_id() {
        // テスト項目: 同じ ID で join した 2 つのコネクションのうち古い方が切断されると、
        //            新しい方が接続中でも ID はレジストリから削除され leave が届く
        // given (前提条件):
        let f = create_fixture();
        let (older, _older_rx) = connect_and_join(&f, Some("p1")).await;
        let (newer, mut newer_rx) = connect_and_join(&f, Some("p1")).await;
        let (_watcher, mut watcher_rx) = connect_and_join(&f, None).await;
        drain(&mut newer_rx);

        // when (操作):
        let outcome = f.usecase.execute(older, DisconnectReason::Closed).await;

        // then (期待する結果):
        let expected = EventMessage::Leave {
            id: "p1".to_string(),
        };
        assert_eq!(outcome.notified.len(), 2);
        assert_eq!(decode_event(&newer_rx.recv().await.unwrap()).unwrap(), expected);
        assert_eq!(decode_event(&watcher_rx.recv().await.unwrap()).unwrap(), expected);
        assert_eq!(f.repository.count_participants().await, 0);
        assert_eq!(
            f.pusher.bound_participant(newer).await.unwrap(),
            Some(ParticipantId::new("p1".to_string()).unwrap())
        );
    }
}
