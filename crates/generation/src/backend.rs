//! The generation backend trait and its request/response types.

use async_trait::async_trait;

use crate::error::GenerationError;

/// A single text-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Upper bound on tokens the backend may produce.
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Raw text returned by a backend.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub text: String,
    pub model: String,
    pub total_tokens: Option<u32>,
}

/// Core trait for generation backends.
///
/// Object-safe so the pipeline can hold an `Arc<dyn GenerationBackend>`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short identifier, e.g. `"openai"` or `"mock"`.
    fn name(&self) -> &'static str;

    /// Whether a credential is configured. Checked at submission time so a
    /// job can be failed immediately instead of retried.
    fn has_credential(&self) -> bool;

    /// Produce text for the request.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Cheap, side-effect-free probe that the configured credential is
    /// accepted by the backend. Used by the diagnostics endpoint.
    async fn check_credential(&self) -> Result<(), GenerationError>;
}
