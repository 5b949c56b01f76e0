//! Conversation state for the tutoring chat.
//!
//! An append-only turn log. Storage grows unbounded within a session;
//! only a suffix window is ever sent to the model.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Ordered log of turns.
///
/// Turns are ordered by submission time. Consecutive same-role turns are
/// allowed (they occur after a failed generation); strict alternation is
/// not an invariant.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
    }

    /// The last `n` turns, in original chronological order.
    pub fn window(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Clear the conversation.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_returns_last_n_in_order() {
        let mut conv = ConversationState::new();
        for i in 0..15 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            conv.push(role, format!("turn {}", i));
        }

        let window = conv.window(10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "turn 5");
        assert_eq!(window[9].content, "turn 14");
    }

    #[test]
    fn test_window_smaller_history() {
        let mut conv = ConversationState::new();
        conv.push(Role::User, "hello");
        assert_eq!(conv.window(10).len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut conv = ConversationState::new();
        conv.push(Role::User, "hello");
        conv.push(Role::Assistant, "hi");
        conv.reset();
        assert!(conv.is_empty());
    }

    #[test]
    fn test_consecutive_same_role_allowed() {
        let mut conv = ConversationState::new();
        conv.push(Role::User, "first try");
        conv.push(Role::User, "retry after error");
        assert_eq!(conv.len(), 2);
    }
}
