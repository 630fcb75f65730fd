//! OpenAI-compatible chat completions backend.
//!
//! Works with the OpenAI API and any server exposing the same
//! `/chat/completions` and `/models` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{GenerationBackend, GenerationRequest, GenerationResponse};
use crate::error::GenerationError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for [`OpenAiBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Load from environment variables.
    ///
    /// | Env Var           | Default                      |
    /// |-------------------|------------------------------|
    /// | `OPENAI_API_KEY`  | unset                        |
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1`  |
    /// | `OPENAI_MODEL`    | `gpt-4o-mini`                |
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

/// Chat completions client.
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to build HTTP client with timeout, using default client");
                reqwest::Client::new()
            });
        Self { client, config }
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling, tests).
    pub fn with_client(client: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)
    }

    /// Map a non-2xx response into [`GenerationError::Api`].
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GenerationError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let api_key = self.api_key()?;
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(model = %self.config.model, "Sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(GenerationResponse {
            text,
            model: parsed.model,
            total_tokens: parsed.usage.map(|u| u.total_tokens),
        })
    }

    async fn check_credential(&self) -> Result<(), GenerationError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(api_key)
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }
}
