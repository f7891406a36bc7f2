//! services/site/src/adapters/message_llm.rs
//!
//! This module contains the adapter for the guestbook message-generating LLM.
//! It implements the `MessageGenerationService` port from the `core` crate against
//! any OpenAI-compatible chat completion endpoint (Gemini by default).

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;
use wedding_site_core::ports::{MessageGenerationService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `MessageGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiMessageAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    /// Bounds the whole completion call, retries included.
    timeout: Duration,
}

impl OpenAiMessageAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }

    /// Builds the adapter from a credential and the provider's base URL.
    pub fn from_credential(api_key: &str, api_base: &str, model: String, timeout: Duration) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self::new(Client::with_config(config), model, timeout)
    }
}

//=========================================================================================
// `MessageGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl MessageGenerationService for OpenAiMessageAdapter {
    async fn generate_message(&self, prompt: &str) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!("Message generation gave no answer within {:?}", self.timeout);
                PortError::Transport(format!("no response within {:?}", self.timeout))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // An empty body is handed back as-is; the composer decides on the fallback.
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
