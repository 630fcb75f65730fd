//! Generation job endpoints.
//!
//! `POST /generation` takes `{"action": "start" | "status", ...}`; the
//! `/jobs` routes are REST aliases for the same two operations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coursecraft_core::course::{validate_form_data, FormData};
use coursecraft_core::error::CoreError;
use coursecraft_core::job::JobStatus;
use coursecraft_core::types::DbId;
use coursecraft_db::repositories::UserRepo;
use coursecraft_pipeline::{JobStatusView, StatusLabel, Submission};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Payload of a start request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    /// Missing form data is treated as an empty form and fails validation.
    #[serde(default)]
    pub form_data: FormData,
    /// Free-form client diagnostics (user agent, screen size). Logged only.
    #[serde(default)]
    pub client_info: Option<serde_json::Value>,
}

/// Body of `POST /generation`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum GenerationCommand {
    Start(StartJobRequest),
    Status {
        #[serde(rename = "jobId")]
        job_id: String,
    },
}

/// POST /api/v1/generation
pub async fn dispatch(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Json(command): Json<GenerationCommand>,
) -> AppResult<Response> {
    match command {
        GenerationCommand::Start(request) => {
            let submission = start_job(&state, auth, request).await?;
            Ok(Json(submission).into_response())
        }
        GenerationCommand::Status { job_id } => {
            Ok(Json(state.pipeline.status(&job_id).await).into_response())
        }
    }
}

/// POST /api/v1/jobs
///
/// Returns 202 Accepted; the job runs in the background.
pub async fn create_job(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Json(request): Json<StartJobRequest>,
) -> AppResult<(StatusCode, Json<Submission>)> {
    let submission = start_job(&state, auth, request).await?;
    Ok((StatusCode::ACCEPTED, Json(submission)))
}

/// GET /api/v1/jobs/{id}
///
/// Same body as the `status` action; an unknown job answers 404.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<JobStatusView>) {
    let view = state.pipeline.status(&job_id).await;
    let code = if view.status == StatusLabel::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    (code, Json(view))
}

/// Validate, charge the caller's quota when signed in, and submit.
///
/// The charge is refunded when no job runs: the submission failed, or the
/// job was failed straight away for lack of a backend credential.
async fn start_job(
    state: &AppState,
    auth: Option<AuthUser>,
    request: StartJobRequest,
) -> AppResult<Submission> {
    let form = request.form_data;
    validate_form_data(&form)?;

    if let Some(client_info) = &request.client_info {
        tracing::debug!(client_info = %client_info, "Client info received");
    }

    let owner_id = auth.as_ref().map(|a| a.user_id);
    let charged = match owner_id {
        Some(user_id) if form.generation_type().consumes_quota() => {
            charge_generation(state, user_id).await?;
            Some(user_id)
        }
        _ => None,
    };

    match state.pipeline.submit(form, owner_id).await {
        Ok(submission) => {
            if submission.status == JobStatus::Error {
                refund(state, charged).await;
            }
            Ok(submission)
        }
        Err(e) => {
            refund(state, charged).await;
            Err(e.into())
        }
    }
}

async fn charge_generation(state: &AppState, user_id: DbId) -> AppResult<()> {
    match UserRepo::consume_generation(&state.pool, user_id).await? {
        Some(user) => {
            tracing::info!(
                user_id,
                tier = %user.subscription_tier,
                remaining = user.remaining_generations,
                "Generation charged",
            );
            Ok(())
        }
        None => {
            tracing::info!(user_id, "Generation refused: quota exhausted");
            Err(AppError::Core(CoreError::Forbidden(
                "No generations remaining on your plan. Upgrade your subscription to continue."
                    .into(),
            )))
        }
    }
}

async fn refund(state: &AppState, charged: Option<DbId>) {
    let Some(user_id) = charged else {
        return;
    };
    match UserRepo::refund_generation(&state.pool, user_id).await {
        Ok(()) => tracing::info!(user_id, "Generation refunded"),
        Err(e) => tracing::error!(user_id, error = %e, "Failed to refund generation"),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn start_command_parses_camel_case_fields() {
        let command: GenerationCommand = serde_json::from_value(serde_json::json!({
            "action": "start",
            "formData": { "subject": "Leadership basics", "audience": "Managers" },
            "clientInfo": { "userAgent": "test" },
        }))
        .unwrap();

        assert_matches!(command, GenerationCommand::Start(req) => {
            assert_eq!(req.form_data.subject, "Leadership basics");
            assert_eq!(req.form_data.audience, "Managers");
            assert!(req.client_info.is_some());
        });
    }

    #[test]
    fn start_without_form_data_is_an_empty_form() {
        let command: GenerationCommand =
            serde_json::from_value(serde_json::json!({ "action": "start" })).unwrap();
        assert_matches!(command, GenerationCommand::Start(req) if req.form_data.subject.is_empty());
    }

    #[test]
    fn status_command_parses_job_id() {
        let command: GenerationCommand = serde_json::from_value(serde_json::json!({
            "action": "status",
            "jobId": "job_1_abc",
        }))
        .unwrap();
        assert_matches!(command, GenerationCommand::Status { job_id } if job_id == "job_1_abc");
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result: Result<GenerationCommand, _> =
            serde_json::from_value(serde_json::json!({ "action": "cancel", "jobId": "x" }));
        assert!(result.is_err());
    }
}
