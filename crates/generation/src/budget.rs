//! Token estimation and the pre-flight request size guard.

use crate::backend::GenerationRequest;
use crate::error::GenerationError;

/// Default ceiling on prompt + completion tokens for one request.
pub const DEFAULT_TOKEN_CEILING: usize = 16_000;

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Rejects requests whose estimated size exceeds a fixed ceiling.
#[derive(Debug, Clone, Copy)]
pub struct TokenBudget {
    pub ceiling: usize,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_TOKEN_CEILING,
        }
    }
}

impl TokenBudget {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    /// Estimate the full request (both prompts plus the completion
    /// allowance) and fail fast if it is over the ceiling.
    ///
    /// Returns the estimate on success.
    pub fn check(&self, request: &GenerationRequest) -> Result<usize, GenerationError> {
        let estimated = estimate_tokens(&request.system_prompt)
            + estimate_tokens(&request.user_prompt)
            + request.max_output_tokens as usize;

        if estimated > self.ceiling {
            return Err(GenerationError::TokenBudgetExceeded {
                estimated,
                ceiling: self.ceiling,
            });
        }
        Ok(estimated)
    }
}
