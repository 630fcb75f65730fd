//! Route definitions for saved courses.

use axum::routing::get;
use axum::Router;

use crate::handlers::courses;
use crate::state::AppState;

/// Routes mounted at `/me/courses`. All require auth.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> save
/// GET    /{id}            -> get
/// DELETE /{id}            -> delete
/// GET    /{id}/download   -> download
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list).post(courses::save))
        .route("/{id}", get(courses::get).delete(courses::delete))
        .route("/{id}/download", get(courses::download))
}
