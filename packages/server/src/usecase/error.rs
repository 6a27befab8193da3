//! UseCase 層のエラー型

use thiserror::Error;

/// 接続受付の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The catch-up snapshot could not be handed to the new connection
    #[error("failed to send catch-up snapshot: {0}")]
    CatchUpFailed(String),
}

/// イベント中継の失敗（いずれもメッセージ単位で破棄され、コネクションは維持される）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// A bound connection sent an event for a different participant id
    #[error("connection is bound to '{bound}' but sent an event for '{received}'")]
    IdentityMismatch { bound: String, received: String },

    /// The connection is no longer in the live set
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
