use async_openai::error::OpenAIError;
use std::time::Duration;

/// Failures of a single completion call against the external provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Completion request failed: {0}")]
    Request(#[from] OpenAIError),
    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Provider response contained no choices")]
    NoChoices,
    #[error("Provider response choice had no content")]
    EmptyContent,
    #[error("Could not build completion request: {0}")]
    InvalidRequest(String),
}

/// Failures while loading prompt templates from disk.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Failed to read prompts from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
