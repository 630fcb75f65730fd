//! Submit a generation job and poll it to a terminal state.
//!
//! Three ceilings bound the wait: a poll timeout measured from submission,
//! a safety timeout around the whole submit-and-poll future, and a limit on
//! consecutive failed status checks. Giving up is local only; nothing is
//! sent to the server.

use std::time::Duration;

use coursecraft_core::course::FormData;
use coursecraft_core::job::Milestone;
use coursecraft_core::materials::Materials;
use tokio::time::Instant;

use crate::api::{ApiError, GenerationApi, RemoteStatus, StatusResponse};

/// Timing limits of a [`Poller`].
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between status checks.
    pub interval: Duration,
    /// Give up this long after submission.
    pub poll_timeout: Duration,
    /// Hard ceiling on the whole operation, including hung requests.
    pub safety_timeout: Duration,
    /// Consecutive failed status checks before giving up.
    pub max_consecutive_errors: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            poll_timeout: Duration::from_secs(90),
            safety_timeout: Duration::from_secs(120),
            max_consecutive_errors: 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Could not start generation: {0}")]
    Submit(#[source] ApiError),

    /// The server answered the start request without a job id.
    #[error("Generation was rejected: {0}")]
    Rejected(String),

    #[error("Generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Generation did not finish within the safety limit of {}s", .0.as_secs())]
    SafetyTimeout(Duration),

    #[error("Could not check status after {attempts} attempts: {last_error}")]
    StatusUnavailable { attempts: u32, last_error: ApiError },

    /// The server no longer knows the job, e.g. after a restart.
    #[error("Job {job_id} was lost by the server. Please try again.")]
    JobLost { job_id: String },

    #[error("Generation failed: {message}")]
    Job {
        message: String,
        details: Option<serde_json::Value>,
    },
}

/// One progress report passed to the caller's callback.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub percent: u8,
    pub milestone: Option<Milestone>,
    pub message: String,
}

impl From<&StatusResponse> for ProgressUpdate {
    fn from(status: &StatusResponse) -> Self {
        Self {
            percent: status.progress_percent,
            milestone: status.milestone,
            message: status.status_message.clone(),
        }
    }
}

pub struct Poller<A> {
    api: A,
    config: PollerConfig,
}

impl<A: GenerationApi> Poller<A> {
    pub fn new(api: A, config: PollerConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Submit `form` and wait for its materials.
    pub async fn generate<F>(
        &self,
        form: &FormData,
        client_info: &serde_json::Value,
        on_progress: F,
    ) -> Result<Materials, PollError>
    where
        F: FnMut(ProgressUpdate) + Send,
    {
        let safety = self.config.safety_timeout;
        match tokio::time::timeout(safety, self.submit_and_poll(form, client_info, on_progress)).await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(safety_secs = safety.as_secs(), "Safety timeout reached");
                Err(PollError::SafetyTimeout(safety))
            }
        }
    }

    async fn submit_and_poll<F>(
        &self,
        form: &FormData,
        client_info: &serde_json::Value,
        on_progress: F,
    ) -> Result<Materials, PollError>
    where
        F: FnMut(ProgressUpdate) + Send,
    {
        let started = Instant::now();
        let submission = self
            .api
            .start(form, client_info)
            .await
            .map_err(PollError::Submit)?;

        let job_id = match submission.job_id {
            Some(id) if submission.success => id,
            _ => {
                return Err(PollError::Rejected(
                    submission
                        .error
                        .unwrap_or_else(|| "no job id returned".to_string()),
                ));
            }
        };

        if submission.status.as_deref() == Some("error") {
            return Err(PollError::Job {
                message: submission
                    .error
                    .unwrap_or_else(|| "job failed at submission".to_string()),
                details: None,
            });
        }

        tracing::info!(job_id = %job_id, "Generation job submitted");
        self.poll(&job_id, started, on_progress).await
    }

    /// Poll `job_id` until it is terminal or a ceiling is hit.
    pub async fn poll<F>(
        &self,
        job_id: &str,
        started: Instant,
        mut on_progress: F,
    ) -> Result<Materials, PollError>
    where
        F: FnMut(ProgressUpdate) + Send,
    {
        let deadline = started + self.config.poll_timeout;
        let mut consecutive_errors = 0u32;

        loop {
            tokio::time::sleep(self.config.interval).await;
            if Instant::now() >= deadline {
                tracing::warn!(job_id, "Poll timeout reached");
                return Err(PollError::Timeout(self.config.poll_timeout));
            }

            let status = match self.api.status(job_id).await {
                Ok(status) => {
                    consecutive_errors = 0;
                    status
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(job_id, attempt = consecutive_errors, error = %e, "Status check failed");
                    if consecutive_errors >= self.config.max_consecutive_errors {
                        return Err(PollError::StatusUnavailable {
                            attempts: consecutive_errors,
                            last_error: e,
                        });
                    }
                    continue;
                }
            };

            on_progress(ProgressUpdate::from(&status));

            match status.status {
                RemoteStatus::Processing => continue,
                RemoteStatus::Completed => {
                    return match status.data {
                        Some(materials) if !materials.is_empty() => Ok(materials),
                        _ => Err(PollError::Job {
                            message: "job completed without materials".to_string(),
                            details: None,
                        }),
                    };
                }
                RemoteStatus::Error => {
                    return Err(PollError::Job {
                        message: status.error.unwrap_or(status.status_message),
                        details: status.error_details,
                    });
                }
                RemoteStatus::NotFound => {
                    return Err(PollError::JobLost {
                        job_id: job_id.to_string(),
                    });
                }
            }
        }
    }
}
