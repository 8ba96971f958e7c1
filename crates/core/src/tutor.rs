//! Scope-Gated Tutor
//!
//! Ties the classifier and the responder together: every student message is
//! classified first, then answered in the mode the classification selects.

use crate::classifier::ScopeClassifier;
use crate::conversation::{ContextWindow, TutorSession};
use crate::llm_client::LlmClient;
use crate::prompts::TutorPrompts;
use crate::responder::{ScopeMode, TutorReply, TutorResponder};
use std::sync::Arc;
use tracing::{info, instrument};

/// Models used for the two kinds of provider calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorModels {
    pub classifier: String,
    pub chat: String,
}

/// The result of handling one student message.
#[derive(Debug)]
pub struct TutorTurn {
    pub in_scope: bool,
    pub reply: TutorReply,
}

pub struct Tutor {
    classifier: ScopeClassifier,
    responder: TutorResponder,
    system_instruction: String,
}

impl Tutor {
    pub fn new(
        client: Arc<dyn LlmClient>,
        models: TutorModels,
        prompts: TutorPrompts,
        window: ContextWindow,
    ) -> Self {
        Self {
            classifier: ScopeClassifier::new(client.clone(), models.classifier, prompts.scope_classifier),
            responder: TutorResponder::new(client, models.chat, prompts.scope_redirect, window),
            system_instruction: prompts.tutor_system,
        }
    }

    /// Starts a fresh session seeded with the tutoring instruction.
    pub fn start_session(&self) -> TutorSession {
        TutorSession::new(self.system_instruction.clone())
    }

    /// Classifies `utterance`, then answers or redirects it.
    #[instrument(name = "tutor_ask", skip_all)]
    pub async fn ask(&self, session: &mut TutorSession, utterance: &str) -> TutorTurn {
        let in_scope = self.classifier.classify(utterance).await;
        info!(in_scope, "Student message classified");

        let reply = self
            .responder
            .respond(session, utterance, ScopeMode::from(in_scope))
            .await;
        TutorTurn { in_scope, reply }
    }
}
