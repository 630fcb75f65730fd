use std::sync::Arc;

use coursecraft_pipeline::JobPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and the pipeline are handles, the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coursecraft_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation job pipeline (store, backend, settings).
    pub pipeline: JobPipeline,
}
