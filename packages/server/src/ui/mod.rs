//! UI 層: axum のルーティングと WebSocket / HTTP ハンドラ

mod error;
mod handler;
mod server;
mod signal;
pub mod state; // UseCase 層からアクセスするため public

pub use error::ProtocolError;
pub use server::{RELAY_PATH, Server, ServerConfig};
