//! Chat-completion client for an OpenAI-compatible endpoint.
//!
//! One request shape is used for everything: a single `user` message carrying
//! the whole prompt, plus temperature and an output-token ceiling. An attempt
//! succeeds only on HTTP 200 with a body that has at least one choice; every
//! other outcome is a [`CompletionError`] and goes back through the
//! [`RetryPolicy`].

mod retry;

pub use retry::{RetryExhausted, RetryPolicy};

use crate::config::AutofillConfig;
use crate::error::{AutofillError, CompletionError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Longest error body kept in a [`CompletionError::Status`].
const MAX_ERROR_BODY: usize = 300;

/// Sampling parameters for one kind of request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionParams {
    /// Form filling: low variance, room for a whole form.
    pub const FILL: Self = Self {
        temperature: 0.2,
        max_tokens: 1300,
    };

    /// Question answering: deterministic and short.
    pub const ANSWER: Self = Self {
        temperature: 0.0,
        max_tokens: 400,
    };
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Posts prompts to the chat-completions endpoint with bounded retry.
#[derive(Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish()
    }
}

impl CompletionClient {
    /// Build a client from `config`. Fails if no API key is configured.
    pub fn from_config(config: &AutofillConfig) -> Result<Self, AutofillError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AutofillError::MissingApiKey)?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AutofillError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            retry: config.retry_policy(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send `prompt`, retrying per the client's policy.
    ///
    /// Returns the trimmed content of the first choice, or every attempt's
    /// error once the budget is spent.
    pub async fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, RetryExhausted<CompletionError>> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        self.retry
            .run("completion", |attempt| self.attempt(&request, attempt))
            .await
    }

    async fn attempt(
        &self,
        request: &ChatRequest<'_>,
        attempt: u32,
    ) -> Result<String, CompletionError> {
        let start = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CompletionError::MalformedResponse("no choices".into()))?;

        debug!(
            "Attempt {}: {} chars in {}ms",
            attempt,
            content.len(),
            start.elapsed().as_millis()
        );
        Ok(content.trim().to_string())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\u{2026}", &s[..idx]),
        None => s.to_string(),
    }
}
