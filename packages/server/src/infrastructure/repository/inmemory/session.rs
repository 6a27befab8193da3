//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! `SessionRegistry` をそのままインメモリストアとして使用します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Participant, ParticipantId, ParticipantState, SessionRegistry, SessionRepository,
};

/// インメモリ Session Repository 実装
pub struct InMemorySessionRepository {
    registry: Arc<Mutex<SessionRegistry>>,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new(registry: Arc<Mutex<SessionRegistry>>) -> Self {
        Self { registry }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(SessionRegistry::new())))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn upsert_on_join(&self, participant: Participant) -> bool {
        let mut registry = self.registry.lock().await;
        registry.upsert_on_join(participant)
    }

    async fn update_state(&self, id: &ParticipantId, state: ParticipantState) -> bool {
        let mut registry = self.registry.lock().await;
        registry.update_state(id, state)
    }

    async fn remove(&self, id: &ParticipantId) -> Option<Participant> {
        let mut registry = self.registry.lock().await;
        registry.remove(id)
    }

    async fn snapshot(&self) -> Vec<Participant> {
        let registry = self.registry.lock().await;
        registry.snapshot().cloned().collect()
    }

    async fn count_participants(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.len()
    }
}
