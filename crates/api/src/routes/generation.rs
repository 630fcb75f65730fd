use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// ```text
/// POST /generation   -> dispatch (start | status)
/// POST /jobs         -> create_job
/// GET  /jobs/{id}    -> get_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generation", post(generation::dispatch))
        .route("/jobs", post(generation::create_job))
        .route("/jobs/{id}", get(generation::get_job))
}
