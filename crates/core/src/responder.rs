//! Tutor Responder
//!
//! Produces the tutor's reply for one student message and records it in the
//! session. In-scope messages are answered with the session history as
//! context; out-of-scope messages get an isolated redirect request whose
//! system instruction never enters the session.
//!
//! A session only changes after a reply actually arrived: a failed call
//! leaves it exactly as it was.

use crate::conversation::{ContextWindow, ConversationTurn, TutorSession};
use crate::error::ProviderError;
use crate::llm_client::{CompletionRequest, LlmClient};
use std::sync::Arc;
use tracing::{instrument, warn};

/// Temperature used for tutoring and redirect replies.
pub const TUTOR_TEMPERATURE: f32 = 0.7;

/// Which kind of reply to produce, as decided by the scope classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    InScope,
    OutOfScope,
}

impl From<bool> for ScopeMode {
    fn from(in_scope: bool) -> Self {
        if in_scope {
            ScopeMode::InScope
        } else {
            ScopeMode::OutOfScope
        }
    }
}

/// Why no reply could be produced.
#[derive(Debug, thiserror::Error)]
#[error("No reply available: {reason}")]
pub struct ResponseFailure {
    #[source]
    pub reason: ProviderError,
}

/// Outcome of a single `respond` call.
#[derive(Debug)]
pub enum TutorReply {
    /// The provider answered; the text was appended to the session.
    Reply(String),
    /// The provider call failed; the session was not modified.
    NoReply(ResponseFailure),
}

impl TutorReply {
    pub fn text(&self) -> Option<&str> {
        match self {
            TutorReply::Reply(text) => Some(text),
            TutorReply::NoReply(_) => None,
        }
    }
}

pub struct TutorResponder {
    client: Arc<dyn LlmClient>,
    model: String,
    redirect_instruction: String,
    window: ContextWindow,
}

impl TutorResponder {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: String,
        redirect_instruction: String,
        window: ContextWindow,
    ) -> Self {
        Self {
            client,
            model,
            redirect_instruction,
            window,
        }
    }

    /// Builds the completion request for `mode`.
    ///
    /// In-scope requests carry `messages` as given. Out-of-scope requests
    /// are prefixed with the redirect instruction.
    pub fn build_request(&self, mode: ScopeMode, messages: Vec<ConversationTurn>) -> CompletionRequest {
        let messages = match mode {
            ScopeMode::InScope => messages,
            ScopeMode::OutOfScope => std::iter::once(ConversationTurn::system(
                self.redirect_instruction.clone(),
            ))
            .chain(messages)
            .collect(),
        };
        CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: TUTOR_TEMPERATURE,
        }
    }

    /// Answers `utterance` in `mode` and records the exchange in `session`.
    #[instrument(name = "respond", skip(self, session, utterance), fields(turns = session.len()))]
    pub async fn respond(
        &self,
        session: &mut TutorSession,
        utterance: &str,
        mode: ScopeMode,
    ) -> TutorReply {
        let messages = match mode {
            ScopeMode::InScope => {
                let mut context = session.context(self.window);
                context.push(ConversationTurn::user(utterance));
                context
            }
            ScopeMode::OutOfScope => vec![ConversationTurn::user(utterance)],
        };

        match self.client.complete(self.build_request(mode, messages)).await {
            Ok(reply) => {
                if mode == ScopeMode::InScope {
                    session.push_user(utterance);
                }
                session.push_assistant(reply.clone());
                TutorReply::Reply(reply)
            }
            Err(reason) => {
                warn!(error = %reason, "Tutor reply failed; session left unchanged");
                TutorReply::NoReply(ResponseFailure { reason })
            }
        }
    }
}
