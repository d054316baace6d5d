use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flock_core::CoreError;
use thiserror::Error;
use tracing::{debug, error};

use crate::envelope::Envelope;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request: bad JSON, bad path or query parameter.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Engine(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(e) => match e {
                CoreError::ImageNotFound(_)
                | CoreError::UnitNotFound(_)
                | CoreError::FileNotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::UnitExists(_) => StatusCode::CONFLICT,
                CoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::RuntimeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                CoreError::Activity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Engine(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "request failed");
        } else {
            debug!(kind = self.kind(), error = %self, "request rejected");
        }
        let body: Envelope<()> = Envelope::Error {
            kind: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
