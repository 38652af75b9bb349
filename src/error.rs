use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::controllers::ApiResponse;

/// Why a booking was not admitted.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Event not found")]
    NotFound,

    #[error("Not enough seats available. Only {available} seats left")]
    InsufficientCapacity { available: i64 },

    #[error("storage failure: {0}")]
    StorageFailure(#[from] sqlx::Error),

    #[error("booking task did not complete: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Startup failures.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// An HTTP error rendered as the standard response envelope.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Logs a storage error and hides it behind a generic message.
    pub fn storage(context: &'static str, err: sqlx::Error) -> Self {
        error!("{}: {:?}", context, err);
        Self::internal(context)
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidInput(message) => ApiError::bad_request(message),
            BookingError::NotFound => ApiError::not_found(err.to_string()),
            BookingError::InsufficientCapacity { .. } => ApiError::conflict(err.to_string()),
            BookingError::StorageFailure(e) => ApiError::storage("Failed to create booking", e),
            BookingError::Aborted(e) => {
                error!("Booking task aborted: {:?}", e);
                ApiError::internal("Failed to create booking")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::failure(self.message))).into_response()
    }
}
