//! Profile and subscription management.

use axum::extract::{Path, State};
use axum::Json;
use coursecraft_core::error::CoreError;
use coursecraft_core::tier::Tier;
use coursecraft_core::types::DbId;
use coursecraft_db::models::user::UserResponse;
use coursecraft_db::repositories::UserRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/subscription`.
#[derive(Debug, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub tier: Tier,
}

/// GET /api/v1/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: auth.user_id.to_string(),
            })
        })?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/admin/users/{id}/subscription
///
/// Move a user to another tier. The generation counter resets to the new
/// tier's quota.
pub async fn update_subscription(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateSubscriptionRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::update_subscription(&state.pool, user_id, input.tier)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id.to_string(),
            })
        })?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id,
        tier = input.tier.as_str(),
        "Subscription tier updated",
    );

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
