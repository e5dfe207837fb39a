//! Unified API error handling with Sentry integration.
//!
//! Route handlers return `Result<T, ApiError>`. Every error is rendered as
//! a JSON body of the form:
//!
//! ```json
//! { "code": 400, "message": "...", "data": { "<field>": { "code": "...", "message": "..." } } }
//! ```
//!
//! `data` is only populated for validation failures and is `{}` otherwise.
//! Server-side errors are captured to Sentry before responding.

use axum::{
    Json,
    extract::rejection::{BytesRejection, FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use address_api_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::forms::SubmitError;

const MALFORMED_BODY_MESSAGE: &str =
    "Failed to load the submitted data due to invalid formatting.";
const INVALID_DATA_MESSAGE: &str = "Failed to submit the form due to invalid data.";
const NOT_FOUND_MESSAGE: &str = "The requested resource wasn't found.";
const INTERNAL_MESSAGE: &str = "Something went wrong while processing your request.";

/// Application-level error type for the address API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be parsed.
    #[error("Malformed body: {0}")]
    MalformedBody(String),

    /// Submitted fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(errors) => Self::Validation(errors),
            SubmitError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: u16,
    message: &'a str,
    data: &'a ValidationErrors,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_)
            | Self::Validation(_)
            | Self::Database(RepositoryError::Conflict(_)) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    const fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => MALFORMED_BODY_MESSAGE,
            Self::Validation(_) | Self::Database(RepositoryError::Conflict(_)) => {
                INVALID_DATA_MESSAGE
            }
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => NOT_FOUND_MESSAGE,
            Self::Database(_) => INTERNAL_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let empty = ValidationErrors::new();
        let data = match &self {
            Self::Validation(errors) => errors,
            _ => &empty,
        };

        let body = ErrorBody {
            code: status.as_u16(),
            message: self.public_message(),
            data,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Add a breadcrumb for record changes.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
