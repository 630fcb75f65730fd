//! Read-only diagnostics.
//!
//! Connectivity is public. The backend probe makes an outbound call and
//! needs a signed-in user; the environment report is admin only and never
//! exposes a variable's value.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use coursecraft_core::types::Timestamp;
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Variables reported by `GET /diagnostics/env`.
const KNOWN_ENV_VARS: &[&str] = &[
    "DATABASE_URL",
    "JWT_SECRET",
    "GENERATION_BACKEND",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_MODEL",
    "GENERATION_MAX_RETRIES",
    "GENERATION_RETRY_DELAY_MS",
    "GENERATION_TOKEN_CEILING",
    "GENERATION_MAX_OUTPUT_TOKENS",
    "JOB_STUCK_THRESHOLD_SECS",
    "JOB_RETENTION_HOURS",
    "JOB_RECOVERY_POLICY",
    "CORS_ORIGINS",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    pub server_time: Timestamp,
    pub job_store_size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendReport {
    pub backend: &'static str,
    pub has_credential: bool,
    /// Whether the credential probe succeeded.
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/v1/diagnostics/connectivity
pub async fn connectivity(State(state): State<AppState>) -> Json<DataResponse<ConnectivityReport>> {
    Json(DataResponse {
        data: ConnectivityReport {
            server_time: Utc::now(),
            job_store_size: state.pipeline.store().len().await,
        },
    })
}

/// GET /api/v1/diagnostics/backend
///
/// Runs the backend's minimal credential probe.
pub async fn backend(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<DataResponse<BackendReport>> {
    let backend = state.pipeline.backend();
    let probe = backend.check_credential().await;
    if let Err(e) = &probe {
        tracing::warn!(
            user_id = auth.user_id,
            backend = backend.name(),
            error = %e,
            "Backend credential probe failed",
        );
    }

    Json(DataResponse {
        data: BackendReport {
            backend: backend.name(),
            has_credential: backend.has_credential(),
            reachable: probe.is_ok(),
            error: probe.err().map(|e| e.to_string()),
        },
    })
}

/// GET /api/v1/diagnostics/env
pub async fn env(RequireAdmin(_admin): RequireAdmin) -> Json<DataResponse<BTreeMap<&'static str, bool>>> {
    let presence = KNOWN_ENV_VARS
        .iter()
        .map(|name| {
            let set = std::env::var(name).is_ok_and(|v| !v.trim().is_empty());
            (*name, set)
        })
        .collect();
    Json(DataResponse { data: presence })
}
