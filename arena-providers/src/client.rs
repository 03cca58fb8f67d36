//! Upstream HTTP client
//!
//! Talks to an OpenAI-compatible chat completions endpoint. Each attempt is
//! bounded by the configured timeout; gateway-style failures are retried with
//! exponential backoff before being reported.

use arena_core::SimulatorSettings;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::{policy_for, FailurePolicy, LiveFailure};

/// Upper bound for a single retry backoff.
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

impl Usage {
    /// Reported total, else prompt plus completion. An overflowing sum is
    /// not a usable count.
    fn total(&self) -> Result<u64, LiveFailure> {
        if let Some(total) = self.total_tokens {
            return Ok(total);
        }
        match (self.prompt_tokens, self.completion_tokens) {
            (Some(prompt), Some(completion)) => prompt.checked_add(completion).ok_or_else(|| {
                LiveFailure::MalformedPayload("token usage overflows".to_string())
            }),
            _ => Err(LiveFailure::MalformedPayload(
                "unparseable token usage".to_string(),
            )),
        }
    }
}

/// A successful completion with parseable token usage.
///
/// Any amount the gateway bills for the simulating model is ignored; records
/// are priced against the target model.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCompletion {
    pub content: String,
    pub total_tokens: u64,
}

/// HTTP client for the simulation upstream.
#[derive(Debug, Clone)]
pub struct SimulatorClient {
    client: Client,
    settings: SimulatorSettings,
}

impl SimulatorClient {
    pub fn new(settings: SimulatorSettings) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(format!("agent-arena/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, settings })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Run a chat completion, retrying transient failures.
    pub async fn complete(
        &self,
        credential: &Credential,
        messages: &[ChatMessage],
    ) -> Result<UpstreamCompletion, LiveFailure> {
        let mut attempts: u32 = 0;
        let mut backoff = self.settings.retry_backoff();

        loop {
            attempts += 1;

            let failure = match self.send_once(credential, messages).await {
                Ok(completion) => return Ok(completion),
                Err(failure) => failure,
            };

            if policy_for(&failure) != FailurePolicy::Retry {
                return Err(failure);
            }

            if attempts > self.settings.max_retries {
                return Err(LiveFailure::RetriesExhausted {
                    attempts,
                    last: Box::new(failure),
                });
            }

            warn!(
                attempt = attempts,
                max_retries = self.settings.max_retries,
                code = failure.code(),
                "Transient upstream failure, retrying in {:?}",
                backoff
            );
            tokio::time::sleep(backoff).await;
            backoff = std::cmp::min(backoff * 2, MAX_RETRY_BACKOFF);
        }
    }

    async fn send_once(
        &self,
        credential: &Credential,
        messages: &[ChatMessage],
    ) -> Result<UpstreamCompletion, LiveFailure> {
        let body = ChatCompletionRequest {
            model: &self.settings.model,
            messages,
            temperature: self.settings.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!(url = %self.chat_url(), model = %self.settings.model, "Sending completion request");

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| LiveFailure::from_transport(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LiveFailure::from_transport(&e))?;

        if !status.is_success() {
            return Err(LiveFailure::from_response(status.as_u16(), &text));
        }

        parse_completion(&text)
    }
}

/// Parse a successful response body. Missing content or usage is malformed.
fn parse_completion(body: &str) -> Result<UpstreamCompletion, LiveFailure> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LiveFailure::MalformedPayload(format!("invalid completion body: {e}")))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| LiveFailure::MalformedPayload("no message content".to_string()))?;

    let usage = parsed
        .usage
        .ok_or_else(|| LiveFailure::MalformedPayload("missing token usage".to_string()))?;

    let total_tokens = usage.total()?;

    Ok(UpstreamCompletion {
        content,
        total_tokens,
    })
}
