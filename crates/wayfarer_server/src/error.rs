//! Mapping of pipeline errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, warn};
use wayfarer_error::{WayfarerError, WayfarerErrorKind};

/// A pipeline error on its way out as an HTTP response.
#[derive(Debug, derive_more::From)]
pub struct ApiError(WayfarerError);

impl ApiError {
    /// Status code for the wrapped error.
    ///
    /// Caller input is 400, a missing entity 404, a backend failure while
    /// listing or writing 502, and configuration problems 500.
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            WayfarerErrorKind::Validation(_) => StatusCode::BAD_REQUEST,
            WayfarerErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            WayfarerErrorKind::Store(_)
            | WayfarerErrorKind::Storage(_)
            | WayfarerErrorKind::Transport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Migration request failed");
        } else {
            warn!(error = %self.0, "Migration request rejected");
        }
        (status, Json(json!({"error": self.0.kind().to_string()}))).into_response()
    }
}
