//! Generation job pipeline.
//!
//! - [`store`] -- in-memory job table with compare-and-swap updates.
//! - [`submit`] -- validates a form, creates the job and starts processing.
//! - [`processor`] -- drives a job through its milestones to a terminal state.
//! - [`status`] -- answers status queries, recovering unknown and stuck jobs.
//! - [`settings`] -- retry, budget, stuck-threshold and recovery settings.

use std::sync::Arc;

use coursecraft_generation::GenerationBackend;

pub mod processor;
pub mod settings;
pub mod status;
pub mod store;
pub mod submit;

pub use settings::{PipelineSettings, RecoveryPolicy};
pub use status::{JobStatusView, StatusLabel};
pub use store::{JobStore, UpdateOutcome};
pub use submit::Submission;

/// Handle to the job pipeline. Cheap to clone; every clone shares the same
/// store and backend.
#[derive(Clone)]
pub struct JobPipeline {
    store: Arc<JobStore>,
    backend: Arc<dyn GenerationBackend>,
    settings: Arc<PipelineSettings>,
}

impl JobPipeline {
    pub fn new(backend: Arc<dyn GenerationBackend>, settings: PipelineSettings) -> Self {
        Self::with_store(Arc::new(JobStore::new()), backend, settings)
    }

    /// Build around an existing store.
    pub fn with_store(
        store: Arc<JobStore>,
        backend: Arc<dyn GenerationBackend>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            backend,
            settings: Arc::new(settings),
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Drop jobs older than the configured retention window.
    pub async fn sweep_expired(&self) -> usize {
        self.store
            .sweep(self.settings.retention, chrono::Utc::now())
            .await
    }
}
