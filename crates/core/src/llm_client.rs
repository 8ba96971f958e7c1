use crate::conversation::{ConversationTurn, Role};
use crate::error::ProviderError;
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A single, non-streaming completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier understood by the provider (e.g., "mistral-medium").
    pub model: String,
    /// Ordered conversation sent as context.
    pub messages: Vec<ConversationTurn>,
    pub temperature: f32,
}

/// A generic client for a text-completion provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one request and returns the text of the first choice.
    ///
    /// Transport errors, timeouts, empty `choices` and choices without
    /// content are all reported as a `ProviderError`.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

/// An implementation of `LlmClient` for any OpenAI-compatible API
/// (Mistral, OpenAI, ...).
pub struct OpenAiCompatibleClient {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAiCompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `timeout` - Upper bound on a single completion call.
    pub fn new(config: OpenAIConfig, timeout: Duration) -> Self {
        Self {
            client: Client::with_config(config),
            timeout,
        }
    }
}

/// Builder failures happen before anything is sent, so they are not
/// reported as request failures.
fn invalid_request(err: OpenAIError) -> ProviderError {
    ProviderError::InvalidRequest(err.to_string())
}

fn to_request_message(turn: &ConversationTurn) -> Result<ChatCompletionRequestMessage, ProviderError> {
    let message = match turn.role() {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(turn.content())
            .build()
            .map_err(invalid_request)?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content())
            .build()
            .map_err(invalid_request)?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content())
            .build()
            .map_err(invalid_request)?
            .into(),
    };
    Ok(message)
}

/// Pulls the reply text out of a completion response.
fn first_choice_text(response: CreateChatCompletionResponse) -> Result<String, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(ProviderError::NoChoices)?;
    choice.message.content.ok_or(ProviderError::EmptyContent)
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let messages = request
            .messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .build()
            .map_err(invalid_request)?;

        debug!(model = %request.model, turns = request.messages.len(), "Sending completion request");

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        first_choice_text(response)
    }
}
