//! Job submission.

use chrono::Utc;
use coursecraft_core::course::{validate_form_data, FormData};
use coursecraft_core::error::CoreError;
use coursecraft_core::job::{JobRecord, JobStatus, Milestone};
use coursecraft_core::types::{DbId, Timestamp};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::JobPipeline;

/// Length of the random part of a job id.
const JOB_ID_SUFFIX_LEN: usize = 9;

/// Error stored on a job when the backend has no credential.
pub const MISSING_CREDENTIAL_ERROR: &str = "generation backend credential is not configured";

/// Answer to a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub success: bool,
    pub job_id: String,
    pub status: JobStatus,
    pub milestone: Milestone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A fresh job id: `job_<unix millis>_<9 lowercase alphanumerics>`.
pub fn generate_job_id(now: Timestamp) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(JOB_ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("job_{}_{suffix}", now.timestamp_millis())
}

impl JobPipeline {
    /// Validate the form, create a `processing` job and start the
    /// background processor.
    ///
    /// Returns a validation error (and creates nothing) when the subject is
    /// blank. A missing backend credential still creates the job, which is
    /// failed straight away.
    pub async fn submit(
        &self,
        form_data: FormData,
        owner_id: Option<DbId>,
    ) -> Result<Submission, CoreError> {
        validate_form_data(&form_data)?;

        let now = Utc::now();
        let mut record = JobRecord::new(generate_job_id(now), form_data, owner_id, now);
        let job_id = loop {
            let id = record.id.clone();
            match self.store().insert_new(record).await {
                Ok(()) => break id,
                Err(mut rejected) => {
                    tracing::debug!(job_id = %id, "Job id collision, regenerating");
                    rejected.id = generate_job_id(now);
                    record = rejected;
                }
            }
        };

        tracing::info!(job_id = %job_id, owner_id = ?owner_id, "Generation job created");

        if !self.backend().has_credential() {
            tracing::error!(
                job_id = %job_id,
                backend = self.backend().name(),
                "Generation backend has no credential, failing job",
            );
            let details = serde_json::json!({ "kind": "configuration", "attempts": 0 });
            self.store()
                .update_if_processing(&job_id, |job| {
                    job.fail(MISSING_CREDENTIAL_ERROR, Some(details), Utc::now())
                })
                .await?;
            return Ok(Submission {
                success: true,
                job_id,
                status: JobStatus::Error,
                milestone: Milestone::Error,
                error: Some(MISSING_CREDENTIAL_ERROR.to_string()),
            });
        }

        let pipeline = self.clone();
        let spawned_id = job_id.clone();
        tokio::spawn(async move {
            pipeline.process(&spawned_id).await;
        });

        Ok(Submission {
            success: true,
            job_id,
            status: JobStatus::Processing,
            milestone: Milestone::JobCreated,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_format() {
        let now = Utc::now();
        let id = generate_job_id(now);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "job");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), JOB_ID_SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn ids_differ_within_the_same_millisecond() {
        let now = Utc::now();
        assert_ne!(generate_job_id(now), generate_job_id(now));
    }
}
