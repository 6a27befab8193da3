//! Repository trait 定義
//!
//! ドメイン層が必要とするセッションレジストリへのアクセスを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Participant, ParticipantId, ParticipantState};

/// Session Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
/// レジストリ操作は失敗しない（未登録 ID への操作は no-op）。
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// 参加者を登録（同じ ID があれば置き換え）。置き換えた場合は `true`
    async fn upsert_on_join(&self, participant: Participant) -> bool;

    /// 登録済み参加者の state を置き換え。未登録なら `false`
    async fn update_state(&self, id: &ParticipantId, state: ParticipantState) -> bool;

    /// 参加者を削除
    async fn remove(&self, id: &ParticipantId) -> Option<Participant>;

    /// 登録済みの全参加者（挿入順）
    async fn snapshot(&self) -> Vec<Participant>;

    /// 登録済みの参加者数
    async fn count_participants(&self) -> usize;
}
