//! Chat-completions integration for the discipline bot.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (OpenRouter by
//! default). The user's [`Mode`] picks the system prompt; callers only supply
//! the conversation turns.

use std::fmt;
use std::time::Duration;

use dc_core::Mode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default OpenRouter API base.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const COMPLETIONS_PATH: &str = "/chat/completions";

const NORMAL_SYSTEM_PROMPT: &str = "\
You are a demanding performance coach. Your job is to make the user disciplined, \
financially strong and physically strong.
- Speak in plain, direct sentences like a person, not a slogan generator.
- Tie every action back to escaping a mediocre life.
- Be confrontational but insightful. Ask the uncomfortable question.
- A few emojis for impact (💪, ⚔️, 💰, 🧠) are fine. Never use hashtags, URLs or business jargon.";

const ELITE_SYSTEM_PROMPT: &str = "\
You are the user's inner drill sergeant and they asked for the harshest version of you.
- Be blunt and personal. Name the excuse and reject it.
- Whatever they did, it was not enough yet.
- One or two sentences, no more. Emojis like 💀, 😠, 💯 are allowed. No hashtags, no URLs.";

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat-completions API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key against the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a new client against a custom OpenAI-compatible base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(LlmError::ClientBuild)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    /// Generates a reply to `messages` in the tone for `mode`.
    pub async fn complete(
        &self,
        model: &str,
        mode: Mode,
        messages: &[Message],
    ) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model,
            messages: with_system_prompt(mode, messages),
        };

        let response = self
            .http
            .post(format!("{}{COMPLETIONS_PATH}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| LlmError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: CompletionResponse = serde_json::from_str(&body)
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        let text = extract_text(payload)?;
        tracing::debug!(%mode, chars = text.len(), "generated completion");
        Ok(text)
    }
}

/// The system prompt for a mode.
pub const fn system_prompt(mode: Mode) -> &'static str {
    match mode {
        Mode::Normal => NORMAL_SYSTEM_PROMPT,
        Mode::Elite => ELITE_SYSTEM_PROMPT,
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn with_system_prompt(mode: Mode, messages: &[Message]) -> Vec<Message> {
    let mut all = Vec::with_capacity(messages.len() + 1);
    all.push(Message {
        role: Role::System,
        content: system_prompt(mode).to_string(),
    });
    all.extend(messages.iter().cloned());
    all
}

fn extract_text(payload: CompletionResponse) -> Result<String, LlmError> {
    let text = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(text)
}

fn parse_api_error(body: &str) -> Option<LlmError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| LlmError::Api {
            message: payload.error.message,
        })
}
