//! API error types.
//!
//! Every error leaving a contacts handler is rendered as a failure
//! [`Envelope`]. Persistence failures are logged here with full detail and
//! reach the client only as a per-action message plus a stable error code.

use crate::envelope::Envelope;
use crate::metrics;
use crate::service::LeadError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leadline_core::ValidationErrors;

pub const NOT_FOUND_MESSAGE: &str = "Contact not found";
pub const VALIDATION_MESSAGE: &str = "The given data was invalid.";

/// The contacts operation a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Show,
    Update,
    Delete,
}

impl Action {
    /// Client-facing message for a persistence failure.
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::List => "Failed to fetch contacts",
            Action::Create => "Failed to submit form. Please try again.",
            Action::Show => "Failed to fetch contact",
            Action::Update => "Failed to update contact",
            Action::Delete => "Failed to delete contact",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Show => "show",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("contact not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// A metadata or storage failure; the detail was logged when this was built.
    #[error("{} failed ({code})", .action.as_str())]
    Failed { action: Action, code: &'static str },
}

impl ApiError {
    /// Map a service failure for `action`, logging persistence errors.
    pub fn from_lead(action: Action, err: LeadError) -> Self {
        let code = match &err {
            LeadError::Validation(errors) => return ApiError::Validation(errors.clone()),
            LeadError::NotFound(_) => return ApiError::NotFound,
            LeadError::Metadata(_) => "metadata_error",
            LeadError::Storage(_) => "storage_error",
        };
        tracing::error!(action = action.as_str(), code, error = %err, "contact request failed");
        ApiError::Failed { action, code }
    }

    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation(_) => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::PayloadTooLarge => "payload_too_large",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::Failed { code, .. } => *code,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::NotFound => NOT_FOUND_MESSAGE.to_string(),
            Self::Validation(_) => VALIDATION_MESSAGE.to_string(),
            Self::BadRequest(detail) => format!("Malformed request: {detail}"),
            Self::MethodNotAllowed(method) => {
                format!("The {method} method is not supported for this route.")
            }
            Self::PayloadTooLarge => "The request body is too large.".to_string(),
            Self::UnsupportedMediaType(content_type) => {
                format!("Unsupported content type: {content_type}")
            }
            Self::Failed { action, .. } => action.failure_message().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        if status.is_server_error() {
            metrics::record_request_failure(code);
        }

        let mut body = Envelope::<()>::failure(self.message(), code);
        if let ApiError::Validation(errors) = self {
            body.errors = Some(errors);
        }
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
