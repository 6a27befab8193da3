//! UseCase: コネクション受付処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - live set への登録と、キャッチアップ（登録済み参加者の join）の送信
//!
//! ### なぜこのテストが必要か
//! - 新規コネクションが既存参加者の最新状態を再構築できることを保証
//! - キャッチアップと以降のイベントの間に取りこぼしや重複がないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のセッションへの接続、既存参加者がいるセッションへの接続
//! - エッジケース：join 後に update された参加者のキャッチアップ

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, Participant, PresenceEvent, PusherChannel, SessionRepository,
};

use super::{error::ConnectError, sequencer::EventSequencer};

/// コネクション受付のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（セッションレジストリの抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（live set とメッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<EventSequencer>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
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

    /// コネクション受付を実行
    ///
    /// コネクションを OPEN として登録し、登録済みの全参加者について
    /// 合成した `join` をこのコネクションに送信する。登録とキャッチアップは
    /// シーケンサの内側で行われるため、以降このコネクションが受け取るのは
    /// キャッチアップより後に起きたイベントだけになる。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Participant>)` - キャッチアップとして送信した参加者
    /// * `Err(ConnectError)` - キャッチアップの送信失敗（コネクションは登録解除される）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<Vec<Participant>, ConnectError> {
        let _guard = self.sequencer.enter().await;

        // 1. live set に登録
        self.message_pusher
            .register_connection(connection_id, sender)
            .await;

        // 2. キャッチアップ対象（このコネクション自身に紐付いた参加者は除外）
        let own = self
            .message_pusher
            .bound_participant(connection_id)
            .await
            .ok()
            .flatten();
        let catch_up: Vec<Participant> = self
            .repository
            .snapshot()
            .await
            .into_iter()
            .filter(|participant| Some(&participant.id) != own.as_ref())
            .collect();

        // 3. 合成した join を送信
        for participant in &catch_up {
            let event = PresenceEvent::from(participant);
            if let Err(e) = self.message_pusher.push_to(connection_id, &event).await {
                self.message_pusher
                    .unregister_connection(connection_id)
                    .await;
                return Err(ConnectError::CatchUpFailed(e.to_string()));
            }
        }

        Ok(catch_up)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{ParticipantId, ParticipantState, Timestamp, Username},
        infrastructure::{
            dto::websocket::{EventMessage, decode_event},
            message_pusher::WebSocketMessagePusher,
            repository::InMemorySessionRepository,
        },
    };

    fn create_usecase() -> (
        ConnectParticipantUseCase,
        Arc<InMemorySessionRepository>,
        Arc<WebSocketMessagePusher>,
    ) {
        let repository = Arc::new(InMemorySessionRepository::default());
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let usecase = ConnectParticipantUseCase::new(
            repository.clone(),
            pusher.clone(),
            Arc::new(EventSequencer::new()),
        );
        (usecase, repository, pusher)
    }

    fn participant(id: &str, username: &str, state: serde_json::Value) -> Participant {
        Participant::new(
            ParticipantId::new(id.to_string()).unwrap(),
            Username::new(username.to_string()),
            ParticipantState::new(state),
            Timestamp::new(1000),
        )
    }

    #[tokio::test]
    async fn test_connect_to_empty_session() {
        // テスト項目: 空のセッションに接続するとキャッチアップは空で、live set に登録される
        // given (前提条件):
        let (usecase, _repository, pusher) = create_usecase();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(ConnectionId::generate(), tx).await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![]));
        assert_eq!(pusher.count_open_connections().await, 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_catch_up_contains_latest_state_in_order() {
        // テスト項目: キャッチアップには登録済みの全参加者が挿入順で、最新の state で含まれる
        // given (前提条件):
        let (usecase, repository, _pusher) = create_usecase();
        repository
            .upsert_on_join(participant("a", "alice", json!({"x": 0})))
            .await;
        repository
            .upsert_on_join(participant("b", "bob", json!({"x": 1})))
            .await;
        repository
            .update_state(
                &ParticipantId::new("a".to_string()).unwrap(),
                ParticipantState::new(json!({"x": 7})),
            )
            .await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(ConnectionId::generate(), tx).await;

        // then (期待する結果):
        assert_eq!(result.unwrap().len(), 2);
        let first = decode_event(&rx.recv().await.unwrap()).unwrap();
        let second = decode_event(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(
            first,
            EventMessage::Join {
                id: "a".to_string(),
                username: "alice".to_string(),
                state: json!({"x": 7}),
            }
        );
        assert_eq!(
            second,
            EventMessage::Join {
                id: "b".to_string(),
                username: "bob".to_string(),
                state: json!({"x": 1}),
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_catch_up_failure_unregisters_connection() {
        // テスト項目: キャッチアップ送信に失敗した場合、コネクションは登録解除される
        // given (前提条件):
        let (usecase, repository, pusher) = create_usecase();
        repository
            .upsert_on_join(participant("a", "alice", json!({})))
            .await;
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        // when (操作):
        let result = usecase.execute(ConnectionId::generate(), tx).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ConnectError::CatchUpFailed(_))));
        assert_eq!(pusher.count_open_connections().await, 0);
    }
}
