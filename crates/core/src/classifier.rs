//! Scope Classifier
//!
//! Decides whether a single student utterance belongs to the supported
//! curriculum. Classification is fail-closed: any provider failure is
//! treated as "not in scope".

use crate::conversation::ConversationTurn;
use crate::llm_client::{CompletionRequest, LlmClient};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Temperature used for classification requests.
pub const CLASSIFIER_TEMPERATURE: f32 = 0.0;

/// Returns true iff the classifier reply, trimmed and lowercased, is exactly `yes`.
pub fn is_affirmative(reply: &str) -> bool {
    reply.trim().to_lowercase() == "yes"
}

pub struct ScopeClassifier {
    client: Arc<dyn LlmClient>,
    model: String,
    instruction: String,
}

impl ScopeClassifier {
    pub fn new(client: Arc<dyn LlmClient>, model: String, instruction: String) -> Self {
        Self {
            client,
            model,
            instruction,
        }
    }

    fn build_request(&self, utterance: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ConversationTurn::system(self.instruction.clone()),
                ConversationTurn::user(utterance),
            ],
            temperature: CLASSIFIER_TEMPERATURE,
        }
    }

    /// Classifies `utterance`; never fails.
    #[instrument(name = "classify", skip_all)]
    pub async fn classify(&self, utterance: &str) -> bool {
        match self.client.complete(self.build_request(utterance)).await {
            Ok(reply) => {
                let in_scope = is_affirmative(&reply);
                debug!(reply = %reply.trim(), in_scope, "Classifier replied");
                in_scope
            }
            Err(e) => {
                warn!(error = %e, "Scope classification failed; treating as out of scope");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::llm_client::MockLlmClient;
    use std::time::Duration;

    fn classifier_replying(reply: &'static str) -> ScopeClassifier {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .returning(move |_| Ok(reply.to_string()));
        ScopeClassifier::new(Arc::new(mock), "mistral-tiny".into(), "classify".into())
    }

    #[test]
    fn test_is_affirmative_exact_match_only() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("  YES\n"));
        assert!(is_affirmative("Yes"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("Yes please"));
        assert!(!is_affirmative("yes, because it is algebra"));
        assert!(!is_affirmative("yes."));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("%$#garbage"));
    }

    #[tokio::test]
    async fn test_classify_yes_is_in_scope() {
        assert!(classifier_replying("YES").classify("Solve x^2-5x+6=0").await);
    }

    #[tokio::test]
    async fn test_classify_other_replies_are_out_of_scope() {
        for reply in ["NO", "Yes please", "", "maybe"] {
            assert!(
                !classifier_replying(reply).classify("anything").await,
                "reply {reply:?} should not be in scope"
            );
        }
    }

    #[tokio::test]
    async fn test_classify_sends_single_turn_deterministic_request() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .withf(|req| {
                req.model == "mistral-tiny"
                    && req.temperature == 0.0
                    && req.messages
                        == vec![
                            ConversationTurn::system("strict classifier"),
                            ConversationTurn::user("What is Newton's second law?"),
                        ]
            })
            .times(1)
            .returning(|_| Ok("yes".to_string()));

        let classifier = ScopeClassifier::new(
            Arc::new(mock),
            "mistral-tiny".into(),
            "strict classifier".into(),
        );
        assert!(classifier.classify("What is Newton's second law?").await);
    }

    #[tokio::test]
    async fn test_classify_failure_is_fail_closed() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .times(3)
            .returning(|_| Err(ProviderError::Timeout(Duration::from_secs(30))));
        let classifier = ScopeClassifier::new(Arc::new(mock), "m".into(), "c".into());

        for _ in 0..3 {
            assert!(!classifier.classify("Solve x^2-5x+6=0").await);
        }
    }

    #[tokio::test]
    async fn test_classify_empty_choices_is_fail_closed() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .returning(|_| Err(ProviderError::NoChoices));
        let classifier = ScopeClassifier::new(Arc::new(mock), "m".into(), "c".into());
        assert!(!classifier.classify("Derive sin(x)").await);
    }
}
