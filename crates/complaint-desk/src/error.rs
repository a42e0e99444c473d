use crate::accounts::AccountServiceError;
use crate::attachments::{AttachmentError, UploadRejection};
use crate::complaints::ComplaintServiceError;
use crate::config::ConfigError;
use crate::store::RepositoryError;
use crate::telemetry::TelemetryError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

/// Failures that stop the process before or while serving.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Storage(AttachmentError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Storage(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<AttachmentError> for AppError {
    fn from(value: AttachmentError) -> Self {
        Self::Storage(value)
    }
}

/// Request-level failures, rendered as `{"error": "..."}` with a matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// The detail is logged, never returned to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                error!(%detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(format!("Invalid JSON body: {}", value.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(value: MultipartRejection) -> Self {
        Self::Validation(format!("Invalid multipart body: {}", value.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::Validation(format!("Invalid query string: {}", value.body_text()))
    }
}

impl From<UploadRejection> for ApiError {
    fn from(value: UploadRejection) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict(detail) => Self::Conflict(detail),
            RepositoryError::NotFound => Self::NotFound("Record not found".to_string()),
            RepositoryError::Unavailable(_) => Self::Internal(value.to_string()),
        }
    }
}

impl From<ComplaintServiceError> for ApiError {
    fn from(value: ComplaintServiceError) -> Self {
        match value {
            ComplaintServiceError::Validation(message) => Self::Validation(message),
            ComplaintServiceError::Upload(rejection) => rejection.into(),
            ComplaintServiceError::Transition(err) => Self::Validation(err.to_string()),
            ComplaintServiceError::NotFound
            | ComplaintServiceError::Repository(RepositoryError::NotFound) => {
                Self::NotFound("Complaint not found".to_string())
            }
            ComplaintServiceError::AttachmentNotFound => {
                Self::NotFound("File not found".to_string())
            }
            ComplaintServiceError::Repository(err) => err.into(),
            ComplaintServiceError::Attachment(AttachmentError::AlreadyExists { name }) => {
                Self::Conflict(format!("Attachment {name} already exists"))
            }
            ComplaintServiceError::Attachment(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AccountServiceError> for ApiError {
    fn from(value: AccountServiceError) -> Self {
        match value {
            AccountServiceError::Validation(err) => Self::Validation(err.to_string()),
            AccountServiceError::EmailTaken => Self::Conflict(value.to_string()),
            AccountServiceError::InvalidCredentials => Self::Unauthorized,
            AccountServiceError::Repository(err) => err.into(),
            AccountServiceError::Credential(err) => Self::Internal(err.to_string()),
        }
    }
}
