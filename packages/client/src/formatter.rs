//! Message formatting utilities for client display.

use serde_json::Value;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a peer-joined notification
    ///
    /// # Arguments
    ///
    /// * `id` - The participant id
    /// * `username` - Display name announced in the join
    /// * `state` - Initial state
    /// * `current_id` - Our own id (to mark as "me")
    ///
    /// # Returns
    ///
    /// A formatted string with the join notification
    pub fn format_peer_joined(id: &str, username: &str, state: &Value, current_id: &str) -> String {
        let me_suffix = if id == current_id { " (me)" } else { "" };
        format!("\n+ {} ({}){} joined with {}\n", id, username, me_suffix, state)
    }

    /// Format a peer state update
    pub fn format_peer_updated(id: &str, state: &Value) -> String {
        format!("\n~ {} is now {}\n", id, state)
    }

    /// Format a peer-left notification
    pub fn format_peer_left(id: &str) -> String {
        format!("\n- {} left\n", id)
    }

    pub fn format_sent_confirmation(state: &Value) -> String {
        format!("published {}\n", state)
    }

    /// Format an input line that is not valid JSON
    pub fn format_invalid_input(error: &str) -> String {
        format!("Invalid JSON state: {}\n", error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_peer_joined() {
        // テスト項目: 他の参加者の参加通知が正しくフォーマットされる
        // given (前提条件):
        let state = json!({"x": 0});

        // when (操作):
        let result = MessageFormatter::format_peer_joined("p2", "bob", &state, "p1");

        // then (期待する結果):
        assert_eq!(result, "\n+ p2 (bob) joined with {\"x\":0}\n");
    }

    #[test]
    fn test_format_peer_joined_marks_me() {
        // テスト項目: 自分自身の join には (me) が付く
        // given (前提条件):
        let state = json!({});

        // when (操作):
        let result = MessageFormatter::format_peer_joined("p1", "alice", &state, "p1");

        // then (期待する結果):
        assert!(result.contains("p1 (alice) (me)"));
    }

    #[test]
    fn test_format_peer_updated_and_left() {
        // テスト項目: 更新通知と退出通知が正しくフォーマットされる
        // given (前提条件):
        let state = json!({"x": 5});

        // when (操作):
        let updated = MessageFormatter::format_peer_updated("p1", &state);
        let left = MessageFormatter::format_peer_left("p1");

        // then (期待する結果):
        assert_eq!(updated, "\n~ p1 is now {\"x\":5}\n");
        assert_eq!(left, "\n- p1 left\n");
    }
}
