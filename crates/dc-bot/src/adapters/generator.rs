//! [`TextGenerator`] backed by the chat-completions client.

use async_trait::async_trait;
use dc_core::Mode;
use dc_engine::{PortError, PromptMessage, PromptRole, TextGenerator};
use dc_llm::{Client, Message};

use crate::config::LlmConfig;

/// Generates replies through the configured model.
///
/// Without an API key every call fails, and the engine sends its fallback
/// text instead.
#[derive(Debug)]
pub struct LlmGenerator {
    client: Option<Client>,
    model: String,
}

impl LlmGenerator {
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                Some(Client::with_base_url(key, config.base_url.as_str())?)
            }
            _ => {
                tracing::warn!("no LLM API key configured, generated messages use the fallback");
                None
            }
        };
        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }
}

fn to_message(prompt: &PromptMessage) -> Message {
    match prompt.role {
        PromptRole::User => Message::user(prompt.content.as_str()),
        PromptRole::Assistant => Message::assistant(prompt.content.as_str()),
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, prompt: &[PromptMessage], mode: Mode) -> Result<String, PortError> {
        let Some(client) = &self.client else {
            return Err(PortError::generation("no API key configured"));
        };
        let messages: Vec<Message> = prompt.iter().map(to_message).collect();
        client
            .complete(&self.model, mode, &messages)
            .await
            .map_err(PortError::generation)
    }
}
