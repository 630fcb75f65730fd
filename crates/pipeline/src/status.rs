//! Status queries.
//!
//! Every query gets an answer; unknown, stuck and empty jobs are handled
//! according to the configured [`RecoveryPolicy`].

use chrono::Utc;
use coursecraft_core::course::FormData;
use coursecraft_core::job::{JobRecord, JobStatus, Milestone};
use coursecraft_core::materials::{placeholder_materials, Materials};
use coursecraft_core::types::Timestamp;
use serde::Serialize;

use crate::settings::RecoveryPolicy;
use crate::JobPipeline;

/// Error recorded on a job that stayed `processing` past the stuck threshold.
pub const EXPIRED_ERROR: &str = "expired";

const NOT_FOUND_MESSAGE: &str = "This generation job could not be found. It may have expired or \
the server may have restarted. Please try again, or contact support if the problem persists.";

/// Status reported to clients. Adds `not_found` to the stored statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    Processing,
    Completed,
    Error,
    NotFound,
}

impl StatusLabel {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatusLabel::Processing)
    }
}

impl From<JobStatus> for StatusLabel {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Processing => StatusLabel::Processing,
            JobStatus::Completed => StatusLabel::Completed,
            JobStatus::Error => StatusLabel::Error,
        }
    }
}

/// Response body of a status query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub success: bool,
    pub job_id: String,
    pub status: StatusLabel,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Materials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<serde_json::Value>,
}

impl From<JobRecord> for JobStatusView {
    fn from(job: JobRecord) -> Self {
        Self {
            success: true,
            job_id: job.id,
            status: job.status.into(),
            progress_percent: job.progress_percent,
            milestone: Some(job.milestone),
            status_message: job.status_message,
            data: job.data,
            error: job.error,
            error_details: job.error_details,
        }
    }
}

impl JobStatusView {
    /// Terminal answer for an id the store does not know.
    pub fn not_found(job_id: &str) -> Self {
        Self {
            success: false,
            job_id: job_id.to_string(),
            status: StatusLabel::NotFound,
            progress_percent: 0,
            milestone: None,
            status_message: NOT_FOUND_MESSAGE.to_string(),
            data: None,
            error: Some("job not found".to_string()),
            error_details: None,
        }
    }
}

impl JobPipeline {
    /// Current status of `job_id`.
    pub async fn status(&self, job_id: &str) -> JobStatusView {
        let now = Utc::now();
        let Some(job) = self.store().get(job_id).await else {
            return self.recover_missing(job_id, now).await;
        };

        let threshold = chrono::Duration::from_std(self.settings().stuck_threshold)
            .unwrap_or(chrono::Duration::MAX);

        match job.status {
            JobStatus::Processing if job.elapsed(now) > threshold => {
                self.recover_stuck(job, now).await
            }
            JobStatus::Completed if job.data.as_ref().map_or(true, Materials::is_empty) => {
                self.recover_empty(job)
            }
            _ => job.into(),
        }
    }

    async fn recover_missing(&self, job_id: &str, now: Timestamp) -> JobStatusView {
        match self.settings().recovery {
            RecoveryPolicy::Explicit => {
                tracing::warn!(job_id, "Status requested for unknown job");
                JobStatusView::not_found(job_id)
            }
            RecoveryPolicy::Fabricate => {
                tracing::warn!(job_id, "Unknown job, answering with placeholder materials");
                let form = FormData::default();
                let materials = placeholder_materials(&form);
                let mut record = JobRecord::new(job_id.to_string(), form, None, now);
                // A fresh record is always processing, so this cannot fail.
                if let Err(e) = record.complete(materials, now) {
                    tracing::error!(job_id, error = %e, "Could not build placeholder job");
                    return JobStatusView::not_found(job_id);
                }
                self.store().set(record.clone()).await;
                record.into()
            }
        }
    }

    async fn recover_stuck(&self, job: JobRecord, now: Timestamp) -> JobStatusView {
        let elapsed_secs = job.elapsed(now).num_seconds();
        let threshold_secs = self.settings().stuck_threshold.as_secs();
        let job_id = job.id.as_str();

        let outcome = match self.settings().recovery {
            RecoveryPolicy::Explicit => {
                tracing::warn!(job_id, elapsed_secs, threshold_secs, "Job stuck, expiring");
                let details = serde_json::json!({
                    "kind": EXPIRED_ERROR,
                    "elapsedSecs": elapsed_secs,
                    "thresholdSecs": threshold_secs,
                });
                self.store()
                    .update_if_processing(job_id, |j| j.fail(EXPIRED_ERROR, Some(details), now))
                    .await
            }
            RecoveryPolicy::Fabricate => {
                tracing::warn!(
                    job_id,
                    elapsed_secs,
                    threshold_secs,
                    "Job stuck, completing with placeholder materials",
                );
                self.store()
                    .update_if_processing(job_id, |j| {
                        let materials = placeholder_materials(&j.form_data);
                        j.complete(materials, now)
                    })
                    .await
            }
        };

        match outcome {
            Ok(outcome) => match outcome.into_record() {
                Some(record) => record.into(),
                None => JobStatusView::not_found(job_id),
            },
            Err(e) => {
                tracing::error!(job_id, error = %e, "Could not recover stuck job");
                job.into()
            }
        }
    }

    fn recover_empty(&self, job: JobRecord) -> JobStatusView {
        match self.settings().recovery {
            RecoveryPolicy::Explicit => {
                tracing::warn!(job_id = %job.id, "Completed job has no sections");
                job.into()
            }
            RecoveryPolicy::Fabricate => {
                tracing::warn!(job_id = %job.id, "Completed job has no sections, regenerating placeholders");
                let materials = placeholder_materials(&job.form_data);
                let mut view = JobStatusView::from(job);
                view.data = Some(materials);
                view
            }
        }
    }
}
