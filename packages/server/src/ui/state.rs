//! Server state shared by all handlers.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetParticipantsUseCase,
    GetSessionStateUseCase, RelayEventUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（コネクション受付のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// RelayEventUseCase（イベント中継のユースケース）
    pub relay_event_usecase: Arc<RelayEventUseCase>,
    /// DisconnectParticipantUseCase（コネクション切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// GetParticipantsUseCase（参加者一覧取得のユースケース）
    pub get_participants_usecase: Arc<GetParticipantsUseCase>,
    /// GetSessionStateUseCase（セッション状態取得のユースケース）
    pub get_session_state_usecase: Arc<GetSessionStateUseCase>,
    /// Per-frame timeout for writes to one client socket
    pub send_timeout: Duration,
}
