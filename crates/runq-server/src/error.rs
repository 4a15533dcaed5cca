//! HTTP error translation.
//!
//! [`AppError::parts`] is the only place where core errors become status codes.
//! API routes render it as JSON, HTML routes wrap it in [`PageError`].

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

use runq_core::domain::{StatusError, SubmitError, ValidationError};

use crate::pages;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Status(#[from] StatusError),

    /// No route matched.
    #[error("page not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status code, machine-readable code and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Submit(SubmitError::Validation(e)) => {
                let message = match e {
                    ValidationError::EmptyKey => "pkg not set".to_string(),
                    other => other.to_string(),
                };
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            AppError::Submit(SubmitError::Capacity { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVER_BUSY",
                "server too busy".to_string(),
            ),
            AppError::Submit(SubmitError::Persistence(e)) => {
                tracing::error!(error = %e, "could not store placeholder result");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "could not store placeholder result".to_string(),
                )
            }
            AppError::Submit(SubmitError::Interrupted) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SHUTTING_DOWN",
                "server is shutting down".to_string(),
            ),
            AppError::Status(StatusError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", format!("no result for {id}"))
            }
            AppError::Status(StatusError::Persistence(e)) => {
                tracing::error!(error = %e, "error fetching result");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "error fetching result".to_string(),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", String::new()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Same errors rendered as an HTML error page.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<SubmitError> for PageError {
    fn from(err: SubmitError) -> Self {
        Self(AppError::Submit(err))
    }
}

impl From<StatusError> for PageError {
    fn from(err: StatusError) -> Self {
        Self(AppError::Status(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, _, message) = self.0.parts();
        (status, Html(pages::error_page(status, &message))).into_response()
    }
}
