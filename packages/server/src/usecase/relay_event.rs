//! UseCase: イベント中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayEventUseCase::execute() メソッド
//! - join / update / leave ごとのレジストリ更新とブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信元にイベントが返らないこと（self-echo なし）を保証
//! - 最初の join でコネクションと参加者 ID が紐付くことを確認
//! - 紐付いた ID と異なる ID のイベントが破棄されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：join → update → leave
//! - エッジケース：join 前の update（レジストリは変更せず中継のみ）
//! - 異常系：ID の不一致、切断済みコネクションからのイベント

use std::sync::Arc;

use relay_shared::time::Clock;

use crate::domain::{
    BroadcastOutcome, ConnectionId, MessagePusher, Participant, PresenceEvent, SessionRepository,
    Timestamp,
};

use super::{error::RelayError, sequencer::EventSequencer};

/// イベント中継のユースケース
pub struct RelayEventUseCase {
    /// Repository（セッションレジストリの抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（live set とメッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<EventSequencer>,
    clock: Arc<dyn Clock>,
}

impl RelayEventUseCase {
    /// 新しい RelayEventUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<EventSequencer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
            clock,
        }
    }

    /// イベント中継を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - イベントを送ってきたコネクション
    /// * `event` - デコード済みのイベント（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(BroadcastOutcome)` - 送信元以外の OPEN コネクションへの配信結果
    /// * `Err(RelayError)` - イベントは破棄された
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        event: PresenceEvent,
    ) -> Result<BroadcastOutcome, RelayError> {
        let _guard = self.sequencer.enter().await;

        // 1. コネクションに紐付いた参加者 ID を確認
        let bound = self
            .message_pusher
            .bound_participant(connection_id)
            .await
            .map_err(|e| RelayError::ConnectionClosed(e.to_string()))?;
        if let Some(bound_id) = &bound
            && bound_id != event.participant_id()
        {
            return Err(RelayError::IdentityMismatch {
                bound: bound_id.to_string(),
                received: event.participant_id().to_string(),
            });
        }

        // 2. レジストリを更新
        match &event {
            PresenceEvent::Join {
                id,
                username,
                state,
            } => {
                if bound.is_none() {
                    self.message_pusher
                        .bind_participant(connection_id, id.clone())
                        .await
                        .map_err(|e| RelayError::ConnectionClosed(e.to_string()))?;
                }
                let replaced = self
                    .repository
                    .upsert_on_join(Participant::new(
                        id.clone(),
                        username.clone(),
                        state.clone(),
                        Timestamp::new(self.clock.now_millis()),
                    ))
                    .await;
                if replaced {
                    tracing::info!("Participant '{}' re-joined; last join wins", id);
                }
            }
            PresenceEvent::Update { id, state } => {
                if bound.is_none() {
                    tracing::debug!(
                        "Update for '{}' before join on connection '{}'; relaying without registry change",
                        id,
                        connection_id
                    );
                } else if !self.repository.update_state(id, state.clone()).await {
                    tracing::debug!("Update for unregistered participant '{}'", id);
                }
            }
            // 切断時に削除するため、ここではレジストリを変更しない
            PresenceEvent::Leave { .. } => {}
        }

        // 3. 送信元以外にブロードキャスト
        let outcome = self
            .message_pusher
            .broadcast(Some(connection_id), &event)
            .await;
        tracing::debug!(
            "Relayed '{}' for '{}' to {} connection(s)",
            event.kind(),
            event.participant_id(),
            outcome.delivered.len()
        );

        Ok(outcome)
    }
}
