//! Shared response envelope types for API handlers.
//!
//! Account, course and diagnostics responses use a `{ "data": ... }`
//! envelope. Generation job responses are returned bare, since clients read
//! `success`, `status` and `jobId` at the top level.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
