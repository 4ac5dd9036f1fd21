use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use benchop_core::{DispatchError, InvocationResult};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

// Output: what a completed invocation looks like to a JSON caller
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    pub exit_code: i32,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<InvocationResult> for InvocationResponse {
    fn from(result: InvocationResult) -> Self {
        Self {
            success: result.success(),
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        }
    }
}

// Output: anything that stopped the tool from completing
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// Body shape picked from the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Exit code as a decimal string.
    Text,
    Json,
}

impl ResponseFormat {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_json = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        if wants_json {
            ResponseFormat::Json
        } else {
            ResponseFormat::Text
        }
    }
}

/// Render a completed invocation. Non-zero exits are 200 unless `strict_status` is set.
pub fn invocation_response(result: InvocationResult, format: ResponseFormat, strict_status: bool) -> Response {
    let status = if strict_status && !result.success() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };

    match format {
        ResponseFormat::Text => (status, result.exit_code.to_string()).into_response(),
        ResponseFormat::Json => (status, Json(InvocationResponse::from(result))).into_response(),
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DispatchError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DispatchError::InvalidProblemIdentifier { .. } | DispatchError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            DispatchError::ToolNotFound { .. }
            | DispatchError::WorkingDirMissing { .. }
            | DispatchError::Spawn(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            warn!("Rejected request: {}", self.0);
        } else {
            error!("Invocation failed: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
