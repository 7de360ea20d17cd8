//! Mapping of pipeline errors onto HTTP responses.

use crate::error::DashboardError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Structured JSON error body.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by route handlers.
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            DashboardError::Upstream {
                context, status, ..
            } => {
                tracing::error!(context = %context, status = ?status, "Upstream failure");
            }
            DashboardError::MalformedRecord { context } => {
                tracing::error!(context = %context, "Malformed upstream record");
            }
            DashboardError::Rebuild(message) => {
                tracing::error!(message = %message, "Rebuild aborted");
            }
        }

        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
