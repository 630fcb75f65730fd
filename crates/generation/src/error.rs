/// Errors from a generation backend call or its pre-flight checks.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Generation backend error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The backend answered 2xx with no usable text.
    #[error("Generation backend returned an empty response")]
    EmptyResponse,

    /// The backend answered 2xx with a body we could not decode.
    #[error("Invalid response from generation backend: {0}")]
    InvalidResponse(String),

    /// No API key is configured for the backend.
    #[error("Generation backend credential is not configured")]
    MissingCredential,

    /// The request would exceed the token ceiling.
    #[error("Request of about {estimated} tokens exceeds the limit of {ceiling} tokens")]
    TokenBudgetExceeded { estimated: usize, ceiling: usize },
}

impl GenerationError {
    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, 5xx, 429 and empty or malformed bodies are
    /// retryable; auth failures, other 4xx and pre-flight failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Request(_) => true,
            GenerationError::Api { status, .. } => *status >= 500 || *status == 429,
            GenerationError::EmptyResponse | GenerationError::InvalidResponse(_) => true,
            GenerationError::MissingCredential | GenerationError::TokenBudgetExceeded { .. } => {
                false
            }
        }
    }

    /// Stable machine-readable label, recorded in job error details.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Request(_) => "transport",
            GenerationError::Api { .. } => "backend_status",
            GenerationError::EmptyResponse => "empty_response",
            GenerationError::InvalidResponse(_) => "invalid_response",
            GenerationError::MissingCredential => "configuration",
            GenerationError::TokenBudgetExceeded { .. } => "token_budget",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(GenerationError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(GenerationError::Api { status: 429, body: String::new() }.is_retryable());
        assert!(!GenerationError::Api { status: 401, body: String::new() }.is_retryable());
        assert!(GenerationError::EmptyResponse.is_retryable());
        assert!(!GenerationError::MissingCredential.is_retryable());
        assert!(!GenerationError::TokenBudgetExceeded { estimated: 10, ceiling: 5 }.is_retryable());
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(GenerationError::EmptyResponse.kind(), "empty_response");
        assert_eq!(GenerationError::MissingCredential.kind(), "configuration");
    }
}
