use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use coursecraft_core::error::CoreError;
use coursecraft_generation::mock::MockBackend;
use coursecraft_generation::openai::{OpenAiBackend, OpenAiConfig};
use coursecraft_generation::GenerationBackend;
use coursecraft_pipeline::PipelineSettings;

use crate::auth::jwt::JwtConfig;

/// Which generation backend the server talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    OpenAi,
    /// Template output, no network. For local development.
    Mock,
}

impl FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "mock" => Ok(BackendKind::Mock),
            other => Err(CoreError::Validation(format!(
                "Invalid generation backend '{other}'. Must be one of: openai, mock"
            ))),
        }
    }
}

/// Generation backend selection and its connection settings.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub backend: BackendKind,
    pub openai: OpenAiConfig,
    /// Simulated latency of the mock backend.
    pub mock_latency: Duration,
}

impl GenerationConfig {
    /// Load from environment variables.
    ///
    /// | Env Var                 | Default  |
    /// |-------------------------|----------|
    /// | `GENERATION_BACKEND`    | `openai` |
    /// | `MOCK_LATENCY_MS`       | `1500`   |
    ///
    /// plus the `OPENAI_*` variables read by [`OpenAiConfig::from_env`].
    pub fn from_env() -> Self {
        let backend: BackendKind = std::env::var("GENERATION_BACKEND")
            .unwrap_or_else(|_| "openai".into())
            .parse()
            .expect("GENERATION_BACKEND must be 'openai' or 'mock'");

        let mock_latency_ms: u64 = std::env::var("MOCK_LATENCY_MS")
            .unwrap_or_else(|_| "1500".into())
            .parse()
            .expect("MOCK_LATENCY_MS must be a valid u64");

        Self {
            backend,
            openai: OpenAiConfig::from_env(),
            mock_latency: Duration::from_millis(mock_latency_ms),
        }
    }

    /// Instantiate the configured backend.
    pub fn build_backend(&self) -> Arc<dyn GenerationBackend> {
        match self.backend {
            BackendKind::OpenAi => Arc::new(OpenAiBackend::new(self.openai.clone())),
            BackendKind::Mock => Arc::new(MockBackend::new(self.mock_latency)),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret and database URL have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub generation: GenerationConfig,
    pub pipeline: PipelineSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// JWT, generation and pipeline settings are read by their own
    /// `from_env` constructors.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            generation: GenerationConfig::from_env(),
            pipeline: PipelineSettings::from_env(),
        }
    }
}
