//! API error-handling module

use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::contact::ContactError;

/// Shown when the message could not be sent for reasons outside the user's control
pub const SEND_FAILURE_MESSAGE: &str =
    "An error occurred while sending your message. Please contact us directly by email.";

/// An error response
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    #[schema(example = false)]
    pub success: bool,

    /// The error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Invalid data.")]
    pub error: Option<String>,

    /// One message per failed validation rule
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(example = json!(["Invalid name.", "Invalid email."]))]
    pub errors: Vec<String>,
}

/// An error raised in the API
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApiError {
    /// The status code
    #[schema(example = 500, value_type = u16)]
    #[serde(with = "http_serde::status_code")]
    pub status: StatusCode,

    /// The error message
    #[schema(example = "Internal server error")]
    pub message: String,

    /// Validation failures, reported instead of `message` when present
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            errors: Vec::new(),
        }
    }

    /// Create a new bad request error
    pub fn new_400(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a new method not allowed error
    pub fn new_405(message: &str) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, message)
    }

    /// Create a new unsupported media type error
    pub fn new_415(message: &str) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    /// Create a new unprocessable entity error listing every failure
    pub fn new_422(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "Invalid submission.".to_string(),
            errors,
        }
    }

    /// Create a new too many requests error
    pub fn new_429(message: &str) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    /// Create new internal server error
    pub fn new_500(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.errors.is_empty() {
            ErrorResponse {
                success: false,
                error: Some(self.message),
                errors: Vec::new(),
            }
        } else {
            ErrorResponse {
                success: false,
                error: None,
                errors: self.errors,
            }
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        unknown_error(&err)
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::RateLimited => {
                ApiError::new_429("Please wait before sending another message.")
            }
            ContactError::InvalidSubmission(fields) => {
                ApiError::new_422(fields.iter().map(|f| f.violation().to_string()).collect())
            }
            ContactError::CouldNotSendEmail(_) => ApiError::new_500(SEND_FAILURE_MESSAGE),
            ContactError::UnknownError(err) => unknown_error(&err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::new_415("Invalid content type."),
            _ => ApiError::new_400("Invalid data."),
        }
    }
}

fn unknown_error(err: &anyhow::Error) -> ApiError {
    error!(error = ?err, "unexpected error while handling request");

    ApiError::new_500(SEND_FAILURE_MESSAGE)
}
