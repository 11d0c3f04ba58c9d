//! Chat completion via the `OpenRouter` OpenAI-compatible API

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::pipeline::Completer;
use crate::{Error, Result};

/// System instruction sent ahead of every utterance
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Single-shot chat completion client
pub struct ChatCompletion {
    client: Client,
    api_key: SecretString,
    url: String,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
}

impl ChatCompletion {
    /// Create a completion client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: SecretString::from(config.api_key.expose_secret()),
            url: format!("{}/chat/completions", config.base_url),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Model identifier used for requests
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the utterance as the sole user turn and await the full reply
    ///
    /// # Errors
    ///
    /// Returns `Error::Completion` on transport failure or timeout, non-success
    /// HTTP status, a malformed body, or an empty first choice
    pub async fn chat(&self, text: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, max_tokens = self.max_tokens, "sending completion");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed");
                if e.is_timeout() {
                    Error::Completion(format!("request timed out after {}s", self.timeout_secs))
                } else {
                    Error::Completion(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Completion(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Completion(format!("API error {status}: {body}")));
        }

        let reply = extract_reply(&body)?;
        tracing::info!(reply_chars = reply.len(), "completion received");
        Ok(reply)
    }
}

#[async_trait]
impl Completer for ChatCompletion {
    async fn complete(&self, text: &str) -> Result<String> {
        self.chat(text).await
    }
}

/// Pull the trimmed first-choice message out of a response body
fn extract_reply(body: &str) -> Result<String> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| Error::Completion(format!("malformed response: {e}")))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::Completion("response contained no choices".to_string()))?
        .message
        .content
        .unwrap_or_default();

    let reply = content.trim();
    if reply.is_empty() {
        return Err(Error::Completion("model returned an empty reply".to_string()));
    }

    Ok(reply.to_string())
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
