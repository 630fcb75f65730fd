//! Periodic removal of old generation jobs from the in-memory store.

use std::time::Duration;

use coursecraft_pipeline::JobPipeline;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Sweep jobs older than the pipeline's retention window every
/// `interval` until `cancel` fires.
pub async fn run(pipeline: JobPipeline, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        retention_secs = pipeline.settings().retention.as_secs(),
        interval_secs = interval.as_secs(),
        "Job retention task started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention task stopping");
                break;
            }
            _ = ticker.tick() => {
                let removed = pipeline.sweep_expired().await;
                if removed > 0 {
                    tracing::info!(removed, "Job retention: purged old jobs");
                } else {
                    tracing::debug!("Job retention: nothing to purge");
                }
            }
        }
    }
}
