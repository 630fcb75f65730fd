//! Generation job record and its forward-only state machine.
//!
//! A job starts in [`JobStatus::Processing`] at [`Milestone::JobCreated`]
//! and ends in exactly one of [`JobStatus::Completed`] or
//! [`JobStatus::Error`]. Terminal states are absorbing: every mutator on
//! [`JobRecord`] refuses to touch a terminal job.

use serde::{Deserialize, Serialize};

use crate::course::FormData;
use crate::error::CoreError;
use crate::materials::Materials;
use crate::types::{DbId, Timestamp};

/// Stored job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

/// Coarse pipeline checkpoints, in the order a job passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    JobCreated,
    ProcessingStarted,
    ApiCallStarted,
    ApiCallComplete,
    ProcessingContent,
    GeneratingMaterials,
    SavingMaterials,
    Completed,
    Error,
}

impl Milestone {
    /// The successful path, first to last.
    pub const PIPELINE: [Milestone; 8] = [
        Milestone::JobCreated,
        Milestone::ProcessingStarted,
        Milestone::ApiCallStarted,
        Milestone::ApiCallComplete,
        Milestone::ProcessingContent,
        Milestone::GeneratingMaterials,
        Milestone::SavingMaterials,
        Milestone::Completed,
    ];

    /// Progress reported on reaching this milestone. `None` for
    /// [`Milestone::Error`], which keeps whatever progress was reached.
    pub fn progress_percent(self) -> Option<u8> {
        match self {
            Milestone::JobCreated => Some(5),
            Milestone::ProcessingStarted => Some(10),
            Milestone::ApiCallStarted => Some(20),
            Milestone::ApiCallComplete => Some(50),
            Milestone::ProcessingContent => Some(70),
            Milestone::GeneratingMaterials => Some(80),
            Milestone::SavingMaterials => Some(90),
            Milestone::Completed => Some(100),
            Milestone::Error => None,
        }
    }

    /// Default status message shown while at this milestone.
    pub fn status_message(self) -> &'static str {
        match self {
            Milestone::JobCreated => "Job created, waiting to start",
            Milestone::ProcessingStarted => "Preparing your request",
            Milestone::ApiCallStarted => "Contacting the generation service",
            Milestone::ApiCallComplete => "Response received",
            Milestone::ProcessingContent => "Processing generated content",
            Milestone::GeneratingMaterials => "Generating course materials",
            Milestone::SavingMaterials => "Saving materials",
            Milestone::Completed => "Course materials are ready",
            Milestone::Error => "Generation failed",
        }
    }
}

/// One generation request and its tracked lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub form_data: FormData,
    pub progress_percent: u8,
    pub milestone: Milestone,
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Materials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<serde_json::Value>,
    /// Account that submitted the job, when the request was authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<DbId>,
    pub started_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
    /// Incremented on every accepted write.
    pub version: u64,
}

impl JobRecord {
    /// A freshly submitted job: `processing`, 5 %, `job_created`.
    pub fn new(id: String, form_data: FormData, owner_id: Option<DbId>, now: Timestamp) -> Self {
        let milestone = Milestone::JobCreated;
        Self {
            id,
            status: JobStatus::Processing,
            form_data,
            progress_percent: milestone.progress_percent().unwrap_or(0),
            milestone,
            status_message: milestone.status_message().to_string(),
            data: None,
            error: None,
            error_details: None,
            owner_id,
            started_at: now,
            completed_at: None,
            updated_at: now,
            version: 0,
        }
    }

    /// Move to a non-terminal milestone. Progress never decreases.
    pub fn advance(&mut self, milestone: Milestone, now: Timestamp) -> Result<(), CoreError> {
        self.ensure_processing()?;
        let percent = match milestone {
            Milestone::Completed | Milestone::Error => {
                return Err(CoreError::Validation(format!(
                    "milestone {milestone:?} is terminal; use complete() or fail()"
                )))
            }
            other => other.progress_percent().unwrap_or(self.progress_percent),
        };
        self.milestone = milestone;
        self.progress_percent = self.progress_percent.max(percent);
        self.status_message = milestone.status_message().to_string();
        self.touch(now);
        Ok(())
    }

    /// Terminal success with the generated materials.
    pub fn complete(&mut self, materials: Materials, now: Timestamp) -> Result<(), CoreError> {
        self.ensure_processing()?;
        self.status = JobStatus::Completed;
        self.milestone = Milestone::Completed;
        self.progress_percent = 100;
        self.status_message = Milestone::Completed.status_message().to_string();
        self.data = Some(materials);
        self.completed_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Terminal failure. Progress stays where it was.
    pub fn fail(
        &mut self,
        error: impl Into<String>,
        details: Option<serde_json::Value>,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        self.ensure_processing()?;
        let error = error.into();
        self.status = JobStatus::Error;
        self.milestone = Milestone::Error;
        self.status_message = format!("{}: {error}", Milestone::Error.status_message());
        self.error = Some(error);
        self.error_details = details;
        self.completed_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Time spent since submission.
    pub fn elapsed(&self, now: Timestamp) -> chrono::Duration {
        now - self.started_at
    }

    fn ensure_processing(&self) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "job {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }
        Ok(())
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }
}
