// HTTP mapping for crate errors.
// Every failure leaves the API as a JSON body with a `detail` message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::error::RepoTreeError;

impl RepoTreeError {
    /// Status code returned to the GUI for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RepoTreeError::AuthenticationRequired | RepoTreeError::InvalidCredential => {
                StatusCode::UNAUTHORIZED
            }
            RepoTreeError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            RepoTreeError::Upstream { .. } | RepoTreeError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            RepoTreeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RepoTreeError::Json(_) | RepoTreeError::Io(_) | RepoTreeError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RepoTreeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let mut body = json!({ "detail": self.to_string() });
        match &self {
            RepoTreeError::RateLimitExceeded { reset, .. } => {
                body["reset"] = json!(reset);
            }
            RepoTreeError::Upstream { status, message } => {
                body["upstream_status"] = json!(status);
                body["upstream_message"] = json!(message);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}
