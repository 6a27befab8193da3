//! WebSocket wire events.
//!
//! ```text
//! {"type":"join",   "id": <string>, "username": <string>, "state": <any>}
//! {"type":"update", "id": <string>, "state": <any>}
//! {"type":"leave",  "id": <string>}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One event on the wire, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Join {
        id: String,
        username: String,
        state: serde_json::Value,
    },
    Update {
        id: String,
        state: serde_json::Value,
    },
    Leave {
        id: String,
    },
}

impl EventMessage {
    pub fn id(&self) -> &str {
        match self {
            EventMessage::Join { id, .. }
            | EventMessage::Update { id, .. }
            | EventMessage::Leave { id } => id,
        }
    }

    /// The state payload carried by `join` and `update`.
    pub fn state(&self) -> Option<&serde_json::Value> {
        match self {
            EventMessage::Join { state, .. } | EventMessage::Update { state, .. } => Some(state),
            EventMessage::Leave { .. } => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Inbound payload that is not a valid wire event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing or non-string `type` field")]
    MissingType,

    #[error("unknown event type '{0}'")]
    UnknownType(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Decode one inbound text frame.
///
/// Unknown `type` values are reported separately from malformed payloads so
/// callers can log them apart; both are dropped by the relay. `state` must be
/// a JSON object; its contents are never inspected.
pub fn decode_event(text: &str) -> Result<EventMessage, DecodeError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

    match value.get("type").and_then(serde_json::Value::as_str) {
        Some("join" | "update" | "leave") => {}
        Some(other) => return Err(DecodeError::UnknownType(other.to_string())),
        None => return Err(DecodeError::MissingType),
    }

    let event: EventMessage =
        serde_json::from_value(value).map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;
    if let Some(state) = event.state()
        && !state.is_object()
    {
        return Err(DecodeError::InvalidPayload(
            "`state` must be a JSON object".to_string(),
        ));
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_join_event() {
        // テスト項目: join イベントがデコードされる
        // given (前提条件):
        let text = r#"{"type":"join","id":"p1","username":"alice","state":{"x":0}}"#;

        // when (操作):
        let result = decode_event(text);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(EventMessage::Join {
                id: "p1".to_string(),
                username: "alice".to_string(),
                state: json!({"x": 0}),
            })
        );
    }

    #[test]
    fn test_decode_update_keeps_state_opaque() {
        // テスト項目: update の state は中身を解釈せずそのまま保持される
        // given (前提条件):
        let text = r#"{"type":"update","id":"p1","state":{"pos":[1,2],"nested":{"k":null}}}"#;

        // when (操作):
        let result = decode_event(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            result,
            EventMessage::Update {
                id: "p1".to_string(),
                state: json!({"pos": [1, 2], "nested": {"k": null}}),
            }
        );
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        // テスト項目: JSON として不正な入力は InvalidJson になる
        // given (前提条件):
        let text = "not json";

        // when (操作):
        let result = decode_event(text);

        // then (期待する結果):
        assert!(matches!(result, Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn test_decode_reports_unknown_type() {
        // テスト項目: 未知の type は UnknownType として報告される
        // given (前提条件):
        let text = r#"{"type":"teleport","id":"p1"}"#;

        // when (操作):
        let result = decode_event(text);

        // then (期待する結果):
        assert_eq!(result, Err(DecodeError::UnknownType("teleport".to_string())));
    }

    #[test]
    fn test_decode_rejects_missing_type() {
        // テスト項目: type フィールドがない入力は MissingType になる
        // given (前提条件):
        let text = r#"{"id":"p1"}"#;

        // when (操作):
        let result = decode_event(text);

        // then (期待する結果):
        assert_eq!(result, Err(DecodeError::MissingType));
    }

    #[test]
    fn test_decode_rejects_missing_required_field() {
        // テスト項目: 必須フィールド（state）が欠けた update は InvalidPayload になる
        // given (前提条件):
        let text = r#"{"type":"update","id":"p1"}"#;

        // when (操作):
        let result = decode_event(text);

        // then (期待する結果):
        assert!(matches!(result, Err(DecodeError::InvalidPayload(_))));
    }

    #[test]
    fn test_decode_rejects_non_object_state() {
        // テスト項目: state がオブジェクトでない join / update は InvalidPayload になる
        // given (前提条件):
        let inputs = [
            r#"{"type":"update","id":"p1","state":42}"#,
            r#"{"type":"update","id":"p1","state":null}"#,
            r#"{"type":"join","id":"p1","username":"alice","state":[1,2]}"#,
        ];

        // when (操作):
        // then (期待する結果):
        for text in inputs {
            assert!(
                matches!(decode_event(text), Err(DecodeError::InvalidPayload(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_leave_serializes_with_type_tag() {
        // テスト項目: leave は type タグ付きの JSON にシリアライズされる
        // given (前提条件):
        let event = EventMessage::Leave {
            id: "p2".to_string(),
        };

        // when (操作):
        let json = event.to_json().unwrap();

        // then (期待する結果):
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, json!({"type": "leave", "id": "p2"}));
    }
}
