//! JSON error responses.
//!
//! Every failure leaves the API as
//! `{"errorCode", "errorKind", "errorDescription", "errorDetails"}`, with the
//! HTTP status picked from the storage error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleetprov_model::ModelError;
use fleetprov_storage::{ErrorKind, StorageError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: u16,
    pub error_kind: String,
    pub error_description: String,
    /// Machine-readable reason, e.g. `EndpointMustHaveOneTypeOfServers`.
    pub error_details: String,
}

#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    code: String,
    description: String,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidInput | ErrorKind::UnknownReference => StatusCode::BAD_REQUEST,
        ErrorKind::CorruptRecord => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl ApiError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.kind)
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        let kind = e.kind();
        match kind {
            ErrorKind::CorruptRecord | ErrorKind::StorageUnavailable => {
                error!(error = %e, "request failed in storage")
            }
            _ => debug!(error = %e, "request rejected"),
        }
        Self::new(kind, e.code(), e.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        StorageError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error_code: status.as_u16(),
            error_kind: self.kind.as_str().to_string(),
            error_description: self.description,
            error_details: self.code,
        };
        (status, Json(body)).into_response()
    }
}
