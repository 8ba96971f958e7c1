//! Conversation Model
//!
//! This module defines the turn-based conversation history that a tutoring
//! session accumulates. A `TutorSession` always starts with its system
//! instruction and only ever grows by appending turns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The speaker of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message unit in a conversation, tagged with its speaker role.
///
/// Turns are immutable once created; the fields are only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Limits how much of the stored history is sent to the provider for an
/// in-scope reply. The stored history itself is never truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextWindow {
    /// Send every stored turn.
    #[default]
    Unbounded,
    /// Send the system turn plus at most the `n` most recent non-system
    /// turns. The window is moved forward to start on a user turn, so the
    /// system turn is never followed directly by an assistant turn.
    LastTurns(usize),
}

impl ContextWindow {
    /// Maps a configured turn cap to a window, with `0` meaning no cap.
    pub fn from_turn_cap(cap: usize) -> Self {
        if cap == 0 {
            ContextWindow::Unbounded
        } else {
            ContextWindow::LastTurns(cap)
        }
    }
}

/// The append-only conversation history of one student's tutoring session.
///
/// Turn 0 is always the system instruction the session was created with.
#[derive(Debug, Clone, Serialize)]
pub struct TutorSession {
    turns: Vec<ConversationTurn>,
}

impl TutorSession {
    /// Starts a session holding only the given system instruction.
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            turns: vec![ConversationTurn::system(system_instruction)],
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The turns shown to the student: everything after the system turn.
    pub fn visible_turns(&self) -> &[ConversationTurn] {
        &self.turns[1..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// A session is never empty, it always holds its system turn.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn system_turn(&self) -> &ConversationTurn {
        &self.turns[0]
    }

    /// Returns the turns to send as multi-turn context under `window`.
    pub fn context(&self, window: ContextWindow) -> Vec<ConversationTurn> {
        match window {
            ContextWindow::Unbounded => self.turns.clone(),
            ContextWindow::LastTurns(n) => {
                let history = &self.turns[1..];
                let tail = &history[history.len().saturating_sub(n)..];
                let start = tail
                    .iter()
                    .position(|t| t.role == Role::User)
                    .unwrap_or(tail.len());
                std::iter::once(self.turns[0].clone())
                    .chain(tail[start..].iter().cloned())
                    .collect()
            }
        }
    }

    pub(crate) fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn::user(content));
    }

    pub(crate) fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn::assistant(content));
    }
}
