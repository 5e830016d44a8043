use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::composer::compose_error_response;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Segment with id {0} not found")]
    SegmentNotFound(Uuid),

    #[error("Percentage of an empty population is undefined")]
    DivisionUndefined,
}

impl AppError {
    /// Status code and the message safe to show to clients.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(_) | AppError::DivisionUndefined => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::SegmentNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ContextError {
            context: "Request failed",
            source: self,
        }
        .into_response()
    }
}

/// An [`AppError`] tagged with the operation that produced it.
#[derive(Error, Debug)]
#[error("{context}: {source}")]
pub struct ContextError {
    pub context: &'static str,
    #[source]
    pub source: AppError,
}

impl IntoResponse for ContextError {
    fn into_response(self) -> Response {
        let (status, message) = self.source.status_and_message();

        if status.is_server_error() {
            error!(context = self.context, error = %self.source, "{}", self);
        } else {
            warn!(context = self.context, error = %self.source, "{}", self);
        }

        (status, Json(compose_error_response(message))).into_response()
    }
}

/// Attaches a handler context to any error convertible into [`AppError`].
pub trait WithContext<T> {
    fn context(self, context: &'static str) -> Result<T, ContextError>;
}

impl<T, E> WithContext<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: &'static str) -> Result<T, ContextError> {
        self.map_err(|e| ContextError {
            context,
            source: e.into(),
        })
    }
}
