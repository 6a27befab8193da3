//! UseCase: セッション状態の取得（HTTP API / デバッグ用）

use std::sync::Arc;

use crate::domain::{MessagePusher, Participant, SessionRepository};

/// セッション全体の概要
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOverview {
    pub participants: Vec<Participant>,
    pub open_connections: usize,
}

/// 登録済み参加者一覧取得のユースケース
pub struct GetParticipantsUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl GetParticipantsUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 登録済みの全参加者（挿入順）
    pub async fn execute(&self) -> Vec<Participant> {
        self.repository.snapshot().await
    }
}

/// セッション状態取得のユースケース
pub struct GetSessionStateUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetSessionStateUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn execute(&self) -> SessionOverview {
        SessionOverview {
            participants: self.repository.snapshot().await,
            open_connections: self.message_pusher.count_open_connections().await,
        }
    }
}
