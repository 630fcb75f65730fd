//! Long-running background tasks, spawned from `main` and stopped through
//! a [`tokio_util::sync::CancellationToken`].

pub mod job_retention;
