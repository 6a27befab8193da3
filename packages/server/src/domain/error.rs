//! Domain 層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("participant id must not be empty")]
    EmptyParticipantId,

    #[error("participant id is too long ({actual} > {max} characters)")]
    ParticipantIdTooLong { max: usize, actual: usize },
}

/// メッセージ送信（通知）に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// Connection is not (or no longer) in the live set
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    /// The connection's outbound channel is closed
    #[error("failed to push message: {0}")]
    PushFailed(String),

    /// The event could not be serialized for the wire
    #[error("failed to encode event: {0}")]
    EncodeFailed(String),
}
