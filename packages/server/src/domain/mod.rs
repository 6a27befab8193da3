//! Domain 層
//!
//! 値オブジェクト、エンティティ、セッションレジストリ、および
//! Infrastructure 層が実装する trait（Repository, MessagePusher）を定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::Participant;
pub use error::{MessagePushError, ValueObjectError};
pub use event::PresenceEvent;
pub use message_pusher::{BroadcastOutcome, MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use registry::SessionRegistry;
pub use repository::SessionRepository;
pub use value_object::{ConnectionId, ParticipantId, ParticipantState, Timestamp, Username};
