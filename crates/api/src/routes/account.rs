use axum::routing::{get, put};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// ```text
/// GET /me                              -> me
/// PUT /admin/users/{id}/subscription   -> update_subscription (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(account::me))
        .route(
            "/admin/users/{id}/subscription",
            put(account::update_subscription),
        )
}
