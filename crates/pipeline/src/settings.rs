//! Pipeline tuning knobs and the status recovery policy.

use std::str::FromStr;
use std::time::Duration;

use coursecraft_core::error::CoreError;
use coursecraft_generation::budget::DEFAULT_TOKEN_CEILING;
use coursecraft_generation::prompt::DEFAULT_MAX_OUTPUT_TOKENS;
use coursecraft_generation::retry::RetryPolicy;

/// What the status query does with unknown, stuck, or empty jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Report `not_found` or expire the job with an error.
    #[default]
    Explicit,
    /// Answer with placeholder materials marked `completed`.
    Fabricate,
}

impl RecoveryPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryPolicy::Explicit => "explicit",
            RecoveryPolicy::Fabricate => "fabricate",
        }
    }
}

impl FromStr for RecoveryPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(RecoveryPolicy::Explicit),
            "fabricate" => Ok(RecoveryPolicy::Fabricate),
            other => Err(CoreError::Validation(format!(
                "Invalid recovery policy '{other}'. Must be one of: explicit, fabricate"
            ))),
        }
    }
}

/// Settings shared by submission, processing and status queries.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub retry: RetryPolicy,
    pub token_ceiling: usize,
    pub max_output_tokens: u32,
    /// A `processing` job older than this is considered stuck.
    pub stuck_threshold: Duration,
    /// Jobs older than this are removed by the retention sweep.
    pub retention: Duration,
    pub recovery: RecoveryPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            token_ceiling: DEFAULT_TOKEN_CEILING,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            stuck_threshold: Duration::from_secs(90),
            retention: Duration::from_secs(24 * 3600),
            recovery: RecoveryPolicy::default(),
        }
    }
}

impl PipelineSettings {
    /// Load from environment variables with defaults.
    ///
    /// | Env Var                          | Default    |
    /// |----------------------------------|------------|
    /// | `GENERATION_MAX_RETRIES`         | `2`        |
    /// | `GENERATION_RETRY_DELAY_MS`      | `2000`     |
    /// | `GENERATION_TOKEN_CEILING`       | `16000`    |
    /// | `GENERATION_MAX_OUTPUT_TOKENS`   | `4000`     |
    /// | `JOB_STUCK_THRESHOLD_SECS`       | `90`       |
    /// | `JOB_RETENTION_HOURS`            | `24`       |
    /// | `JOB_RECOVERY_POLICY`            | `explicit` |
    pub fn from_env() -> Self {
        let max_retries: u32 = env_or("GENERATION_MAX_RETRIES", "2")
            .parse()
            .expect("GENERATION_MAX_RETRIES must be a valid u32");

        let retry_delay_ms: u64 = env_or("GENERATION_RETRY_DELAY_MS", "2000")
            .parse()
            .expect("GENERATION_RETRY_DELAY_MS must be a valid u64");

        let token_ceiling: usize = env_or("GENERATION_TOKEN_CEILING", "16000")
            .parse()
            .expect("GENERATION_TOKEN_CEILING must be a valid usize");

        let max_output_tokens: u32 = env_or("GENERATION_MAX_OUTPUT_TOKENS", "4000")
            .parse()
            .expect("GENERATION_MAX_OUTPUT_TOKENS must be a valid u32");

        let stuck_secs: u64 = env_or("JOB_STUCK_THRESHOLD_SECS", "90")
            .parse()
            .expect("JOB_STUCK_THRESHOLD_SECS must be a valid u64");

        let retention_hours: u64 = env_or("JOB_RETENTION_HOURS", "24")
            .parse()
            .expect("JOB_RETENTION_HOURS must be a valid u64");

        let recovery: RecoveryPolicy = env_or("JOB_RECOVERY_POLICY", "explicit")
            .parse()
            .expect("JOB_RECOVERY_POLICY must be 'explicit' or 'fabricate'");

        Self {
            retry: RetryPolicy::fixed(max_retries, Duration::from_millis(retry_delay_ms)),
            token_ceiling,
            max_output_tokens,
            stuck_threshold: Duration::from_secs(stuck_secs),
            retention: Duration::from_secs(retention_hours * 3600),
            recovery,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
