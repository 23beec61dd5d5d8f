//! Language-model invocation.
//!
//! [`ChatBackend`] is the seam between the pipeline and the model provider.
//! [`OpenAiClient`] implements it over an OpenAI-compatible
//! `/chat/completions` endpoint. Neither performs retries.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::InsightError;
use crate::prompt::RenderedPrompt;

/// Sampling temperature for chart insights.
pub const CHART_TEMPERATURE: f64 = 0.7;

/// Output cap for chart insights; roughly one sentence.
pub const CHART_MAX_TOKENS: u32 = 100;

/// How the model is asked to shape its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Json,
    Text,
}

/// Everything a backend needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub mode: ResponseMode,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// JSON-object response, model defaults for temperature and length.
    #[must_use]
    pub fn comment_analysis(model: &str, prompt: RenderedPrompt) -> Self {
        Self {
            model: model.to_string(),
            system: prompt.system.to_string(),
            user: prompt.user,
            mode: ResponseMode::Json,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Free text at [`CHART_TEMPERATURE`], capped at [`CHART_MAX_TOKENS`].
    #[must_use]
    pub fn chart_insight(model: &str, prompt: RenderedPrompt) -> Self {
        Self {
            model: model.to_string(),
            system: prompt.system.to_string(),
            user: prompt.user,
            mode: ResponseMode::Text,
            temperature: Some(CHART_TEMPERATURE),
            max_tokens: Some(CHART_MAX_TOKENS),
        }
    }
}

/// A chat-completion style model backend.
///
/// Implementations must be shareable across concurrent requests without
/// per-request mutable state.
pub trait ChatBackend: Send + Sync {
    /// Send one request and return the raw textual reply.
    ///
    /// # Errors
    ///
    /// Transport and backend-side failures, surfaced as
    /// [`InsightError::Http`], [`InsightError::Upstream`] or
    /// [`InsightError::EmptyCompletion`].
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, InsightError>> + Send;
}

/// Connection settings for [`OpenAiClient`].
#[derive(Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    /// Base URL without the `/chat/completions` suffix, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP client for OpenAI-compatible chat completions.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
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

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Creates a client bound to `settings.base_url`.
    ///
    /// The timeout applies to each whole request; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: &OpenAiSettings) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ytlens/0.1 (comment-insights)")
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            url: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
        })
    }

    fn body<'a>(request: &'a ChatRequest) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &request.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: match request.mode {
                ResponseMode::Json => Some(ResponseFormat {
                    format_type: "json_object",
                }),
                ResponseMode::Text => None,
            },
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, InsightError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&Self::body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(InsightError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(InsightError::EmptyCompletion)
    }
}

impl ChatBackend for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, InsightError> {
        tracing::debug!(
            model = %request.model,
            mode = ?request.mode,
            prompt_chars = request.user.chars().count(),
            "sending chat completion"
        );
        self.send(request).await
    }
}
