//! HTTP binding for `POST /api/v1/generation`.

use async_trait::async_trait;
use coursecraft_core::course::FormData;
use coursecraft_core::job::Milestone;
use coursecraft_core::materials::Materials;
use serde::Deserialize;

/// Errors from the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network, DNS or TLS failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// 2xx with a body that does not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Answer to a `start` action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    #[serde(default)]
    pub success: bool,
    pub job_id: Option<String>,
    /// `processing`, or `error` when the job failed at submission.
    pub status: Option<String>,
    pub error: Option<String>,
}

/// Status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    Processing,
    Completed,
    Error,
    NotFound,
}

/// Answer to a `status` action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    pub status: RemoteStatus,
    #[serde(default)]
    pub progress_percent: u8,
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub status_message: String,
    pub data: Option<Materials>,
    pub error: Option<String>,
    pub error_details: Option<serde_json::Value>,
}

/// The two operations the poller needs. Implemented over HTTP by
/// [`HttpGenerationApi`]; tests substitute scripted fakes.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn start(
        &self,
        form: &FormData,
        client_info: &serde_json::Value,
    ) -> Result<StartResponse, ApiError>;

    async fn status(&self, job_id: &str) -> Result<StatusResponse, ApiError>;
}

/// `reqwest` implementation against a running API server.
pub struct HttpGenerationApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGenerationApi {
    /// * `base_url` - server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` so generations are charged to
    /// that account.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn post_action<T>(&self, body: &serde_json::Value) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = self
            .client
            .post(format!("{}/api/v1/generation", self.base_url))
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GenerationApi for HttpGenerationApi {
    async fn start(
        &self,
        form: &FormData,
        client_info: &serde_json::Value,
    ) -> Result<StartResponse, ApiError> {
        let body = serde_json::json!({
            "action": "start",
            "formData": form,
            "clientInfo": client_info,
        });
        self.post_action(&body).await
    }

    async fn status(&self, job_id: &str) -> Result<StatusResponse, ApiError> {
        let body = serde_json::json!({
            "action": "status",
            "jobId": job_id,
        });
        self.post_action(&body).await
    }
}
