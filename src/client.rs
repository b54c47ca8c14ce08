//! Blocking client for OpenAI-compatible chat-completion endpoints.

use crate::{prompt, reply, Error, RecordConfig, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat message as sent to the API.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// The two messages for one categorisation request: the fixed system
/// instruction, then `user_prompt`, a blank line, and `text`.
pub fn build_messages(user_prompt: &str, text: &str) -> Vec<Message> {
    vec![
        Message::system(prompt::SYSTEM_PROMPT),
        Message::user(format!("{user_prompt}\n\n{text}")),
    ]
}

/// Sends chat-completion requests to a single endpoint with one model.
pub struct ModelClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ModelClient {
    /// Client for `{base_url}/chat/completions`.
    ///
    /// With `timeout` set to `None` a request may wait forever.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        // reqwest's blocking client defaults to a 30s timeout; `None` here
        // turns that off.
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Client built from the API settings in `config`.
    pub fn from_config(config: &RecordConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            config.model.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `messages` and return the first choice's content, trimmed.
    pub fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        tracing::info!(model = %self.model, endpoint = %self.endpoint, "sending chat completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json()?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(Error::EmptyReply)
    }

    /// Ask the model to categorise `text` and return the JSON object from its
    /// reply, verbatim.
    ///
    /// Fails with [`Error::NoJsonFound`] or [`Error::MalformedJson`] when the
    /// reply holds no usable object; both carry the raw reply.
    pub fn query(&self, text: &str, user_prompt: &str) -> Result<String> {
        let reply = self.complete(&build_messages(user_prompt, text))?;
        reply::extract_json_object(&reply).map(str::to_owned)
    }
}
