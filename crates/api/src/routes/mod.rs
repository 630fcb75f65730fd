pub mod account;
pub mod auth;
pub mod courses;
pub mod diagnostics;
pub mod generation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                      register (public)
/// /auth/login                         login (public)
/// /auth/refresh                       refresh (public)
/// /auth/logout                        logout (requires auth)
///
/// /generation                         start | status by action (auth optional)
/// /jobs                               start (POST, auth optional)
/// /jobs/{id}                          status (GET)
///
/// /me                                 profile + subscription (requires auth)
/// /me/courses                         list, save
/// /me/courses/{id}                    get, delete
/// /me/courses/{id}/download           Markdown attachment
///
/// /admin/users/{id}/subscription      change tier (admin only)
///
/// /diagnostics/connectivity           server time, job store size
/// /diagnostics/backend                credential probe
/// /diagnostics/env                    env var presence
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(generation::router())
        .merge(account::router())
        .nest("/me/courses", courses::router())
        .nest("/diagnostics", diagnostics::router())
}
