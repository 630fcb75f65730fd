//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use coursecraft_core::course::FormData;
use coursecraft_core::job::JobRecord;
use coursecraft_generation::mock::MockBackend;
use coursecraft_generation::retry::RetryPolicy;
use coursecraft_generation::{GenerationBackend, GenerationError, GenerationRequest, GenerationResponse};
use coursecraft_pipeline::{JobPipeline, PipelineSettings, RecoveryPolicy};

/// Backend that replays a fixed script of results, one per call. Once the
/// script runs out it keeps returning the last entry.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, u16>>>,
    last: Mutex<Result<String, u16>>,
    pub calls: AtomicU32,
    credential: bool,
}

impl ScriptedBackend {
    /// `Ok(text)` is a response body; `Err(status)` is an HTTP status error.
    pub fn new(script: Vec<Result<String, u16>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Err(500)),
            calls: AtomicU32::new(0),
            credential: true,
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn without_credential() -> Self {
        Self {
            credential: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(entry) = script.pop_front() {
                *last = entry.clone();
            }
            last.clone()
        };
        match next {
            Ok(text) => Ok(GenerationResponse {
                text,
                model: "scripted".into(),
                total_tokens: None,
            }),
            Err(status) => Err(GenerationError::Api {
                status,
                body: format!("status {status}"),
            }),
        }
    }

    async fn check_credential(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

/// Backend whose calls never finish.
pub struct HangingBackend;

#[async_trait]
impl GenerationBackend for HangingBackend {
    fn name(&self) -> &'static str {
        "hanging"
    }

    fn has_credential(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        std::future::pending().await
    }

    async fn check_credential(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        retry: RetryPolicy::fixed(2, Duration::from_millis(1)),
        ..PipelineSettings::default()
    }
}

pub fn pipeline(backend: Arc<dyn GenerationBackend>) -> JobPipeline {
    JobPipeline::new(backend, fast_settings())
}

pub fn mock_pipeline() -> JobPipeline {
    pipeline(Arc::new(MockBackend::default()))
}

pub fn pipeline_with_policy(
    backend: Arc<dyn GenerationBackend>,
    recovery: RecoveryPolicy,
) -> JobPipeline {
    JobPipeline::new(
        backend,
        PipelineSettings {
            recovery,
            ..fast_settings()
        },
    )
}

pub fn form(subject: &str) -> FormData {
    FormData {
        subject: subject.into(),
        ..Default::default()
    }
}

/// Poll the store until the job is terminal. Panics after ~5 s.
pub async fn wait_terminal(pipeline: &JobPipeline, job_id: &str) -> JobRecord {
    for _ in 0..500 {
        if let Some(job) = pipeline.store().get(job_id).await {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} did not reach a terminal state");
}
