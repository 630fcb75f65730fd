//! Background processor: drives one job from `job_created` to a terminal
//! state.
//!
//! Failures never escape the spawned task; they are written onto the job
//! record as `error` plus `errorDetails`.

use chrono::Utc;
use coursecraft_core::job::Milestone;
use coursecraft_core::materials::Materials;
use coursecraft_generation::budget::TokenBudget;
use coursecraft_generation::parser::parse_materials;
use coursecraft_generation::prompt::build_request;
use coursecraft_generation::retry::{retry_with_backoff, RetryError};
use coursecraft_generation::GenerationError;

use crate::store::UpdateOutcome;
use crate::JobPipeline;

impl JobPipeline {
    /// Run the job to completion or failure.
    ///
    /// Stops quietly as soon as the record is found terminal (for example
    /// after a status query expired it) or missing.
    pub async fn process(&self, job_id: &str) {
        if !self.advance(job_id, Milestone::ProcessingStarted).await {
            return;
        }

        let Some(job) = self.store().get(job_id).await else {
            return;
        };
        let request = build_request(&job.form_data, self.settings().max_output_tokens);

        match TokenBudget::new(self.settings().token_ceiling).check(&request) {
            Ok(estimated) => {
                tracing::debug!(job_id, estimated_tokens = estimated, "Token budget check passed");
            }
            Err(e) => {
                let details = serde_json::json!({ "kind": e.kind(), "attempts": 0 });
                self.fail(job_id, e.to_string(), details).await;
                return;
            }
        }

        if !self.advance(job_id, Milestone::ApiCallStarted).await {
            return;
        }

        let backend = self.backend().as_ref();
        let request = &request;
        let result = retry_with_backoff(
            &self.settings().retry,
            GenerationError::is_retryable,
            move |attempt| async move {
                tracing::debug!(job_id, attempt, backend = backend.name(), "Calling generation backend");
                backend.generate(request).await
            },
        )
        .await;

        let (response, attempts) = match result {
            Ok(ok) => ok,
            Err(RetryError {
                attempts,
                last_error,
            }) => {
                let details = serde_json::json!({
                    "attempts": attempts,
                    "lastError": last_error.to_string(),
                    "kind": last_error.kind(),
                });
                self.fail(job_id, format!("Generation failed: {last_error}"), details)
                    .await;
                return;
            }
        };

        tracing::info!(
            job_id,
            attempts,
            model = %response.model,
            total_tokens = ?response.total_tokens,
            "Generation backend responded",
        );

        if !self.advance(job_id, Milestone::ApiCallComplete).await
            || !self.advance(job_id, Milestone::ProcessingContent).await
        {
            return;
        }

        let parsed = parse_materials(&response.text);
        tracing::debug!(
            job_id,
            strategy = parsed.strategy.as_str(),
            sections = parsed.materials.sections.len(),
            "Parsed generated content",
        );

        if !self.advance(job_id, Milestone::GeneratingMaterials).await
            || !self.advance(job_id, Milestone::SavingMaterials).await
        {
            return;
        }

        self.complete(job_id, parsed.materials).await;
    }

    /// Move to `milestone`. Returns `false` when processing should stop.
    async fn advance(&self, job_id: &str, milestone: Milestone) -> bool {
        let outcome = self
            .store()
            .update_if_processing(job_id, |job| job.advance(milestone, Utc::now()))
            .await;
        self.note_outcome(job_id, milestone, outcome)
    }

    async fn complete(&self, job_id: &str, materials: Materials) {
        let sections = materials.sections.len();
        let outcome = self
            .store()
            .update_if_processing(job_id, |job| job.complete(materials, Utc::now()))
            .await;
        if self.note_outcome(job_id, Milestone::Completed, outcome) {
            tracing::info!(job_id, sections, "Generation job completed");
        }
    }

    async fn fail(&self, job_id: &str, error: String, details: serde_json::Value) {
        tracing::warn!(job_id, error = %error, "Generation job failed");
        let outcome = self
            .store()
            .update_if_processing(job_id, |job| job.fail(error, Some(details), Utc::now()))
            .await;
        self.note_outcome(job_id, Milestone::Error, outcome);
    }

    fn note_outcome(
        &self,
        job_id: &str,
        milestone: Milestone,
        outcome: Result<UpdateOutcome, coursecraft_core::error::CoreError>,
    ) -> bool {
        match outcome {
            Ok(UpdateOutcome::Applied(_)) => {
                tracing::debug!(job_id, milestone = ?milestone, "Job milestone reached");
                true
            }
            Ok(UpdateOutcome::AlreadyTerminal(job)) => {
                tracing::info!(
                    job_id,
                    milestone = ?milestone,
                    status = job.status.as_str(),
                    "Job already terminal, processor stopping",
                );
                false
            }
            Ok(UpdateOutcome::NotFound) => {
                tracing::warn!(job_id, milestone = ?milestone, "Job vanished during processing");
                false
            }
            Err(e) => {
                tracing::error!(job_id, milestone = ?milestone, error = %e, "Job update rejected");
                false
            }
        }
    }
}
