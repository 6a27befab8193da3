//! UseCase 層
//!
//! リレーの各操作（接続受付、イベント中継、切断、状態取得）を実装します。
//! 全てのユースケースは同じ `EventSequencer` を共有し、レジストリ更新と
//! ブロードキャストを一つの全順序に直列化します。

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_session_state;
pub mod relay_event;
pub mod sequencer;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::{
    DisconnectOutcome, DisconnectParticipantUseCase, DisconnectReason,
};
pub use error::{ConnectError, RelayError};
pub use get_session_state::{GetParticipantsUseCase, GetSessionStateUseCase, SessionOverview};
pub use relay_event::RelayEventUseCase;
pub use sequencer::EventSequencer;
