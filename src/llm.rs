//! Chat completion client abstraction
//!
//! A single request/response call to a remote chat-completion service.
//! Clients are stateless between calls and never retry.

mod anthropic;
mod error;
mod types;

#[cfg(test)]
mod proptests;

pub use anthropic::AnthropicService;
pub use error::{LlmError, LlmErrorKind};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for chat completion providers
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Make one completion request
    async fn send(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;

    /// Complete a text conversation and return the first content block's text
    ///
    /// `history` must be non-empty, start with a user message and alternate
    /// roles; `max_tokens` must be positive. Violations fail without touching
    /// the network.
    async fn complete(
        &self,
        system: &str,
        history: &[LlmMessage],
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        validate_history(history)?;
        validate_max_tokens(max_tokens)?;

        let request = LlmRequest {
            system: system.to_string(),
            messages: history.to_vec(),
            max_tokens,
        };
        let response = self.send(&request).await?;
        response.first_text().map(str::to_string)
    }

    /// Single-message completion carrying an image ahead of `prompt`
    async fn complete_with_image(
        &self,
        system: &str,
        image: ImageSource,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        validate_max_tokens(max_tokens)?;

        let request = LlmRequest {
            system: system.to_string(),
            messages: vec![LlmMessage {
                role: MessageRole::User,
                content: vec![ContentBlock::image(image), ContentBlock::text(prompt)],
            }],
            max_tokens,
        };
        let response = self.send(&request).await?;
        response.first_text().map(str::to_string)
    }
}

fn validate_max_tokens(max_tokens: u32) -> Result<(), LlmError> {
    if max_tokens == 0 {
        return Err(LlmError::invalid_request("max_tokens must be positive"));
    }
    Ok(())
}

fn validate_history(history: &[LlmMessage]) -> Result<(), LlmError> {
    let Some(first) = history.first() else {
        return Err(LlmError::invalid_request("message history is empty"));
    };
    if first.role != MessageRole::User {
        return Err(LlmError::invalid_request(
            "message history must start with a user message",
        ));
    }
    if let Some(pos) = history.windows(2).position(|w| w[0].role == w[1].role) {
        return Err(LlmError::invalid_request(format!(
            "message history does not alternate roles at index {}",
            pos + 1
        )));
    }
    Ok(())
}

#[async_trait]
impl<T: ChatCompletionClient + ?Sized> ChatCompletionClient for Arc<T> {
    async fn send(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).send(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for chat completion clients
pub struct LoggingClient {
    inner: Arc<dyn ChatCompletionClient>,
    model_id: String,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn ChatCompletionClient>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl ChatCompletionClient for LoggingClient {
    async fn send(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    messages = request.messages.len(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "Chat completion finished"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    kind = ?e.kind(),
                    retryable = e.kind().is_retryable(),
                    "Chat completion failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
