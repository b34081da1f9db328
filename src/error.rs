//! Error shaping for the HTTP surface.
//!
//! Only pre-flight failures are synthesized here: a wrong verb, a missing
//! path parameter, a missing credential, or a transport failure on the way
//! to the gateway. Anything the gateway itself answers — including business
//! errors — is relayed verbatim and never passes through this type.

use crate::payments::error::GatewayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// A required request parameter was absent; no upstream call was made.
    #[error("{0}")]
    BadRequest(String),

    /// The gateway credential is not configured; no upstream call was made.
    #[error("{0}")]
    Configuration(String),

    /// A network-level failure reaching the gateway.
    #[error("{0}")]
    UpstreamTransport(String),
}

impl ApiError {
    pub fn http_status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamTransport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status_code();
        let body = Json(json!({
            "error": true,
            "message": self.user_message(),
        }));
        (status, body).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingCredential { .. } => ApiError::Configuration(err.to_string()),
            GatewayError::Transport { message } => ApiError::UpstreamTransport(message),
        }
    }
}
