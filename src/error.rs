//! Error types for the student records service
//!
//! Provides unified error handling using thiserror. Store and request
//! failures are logged with their cause, but the client only ever sees
//! the fixed message for the failed operation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::messages::{Locale, Operation};
use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failure of a call against the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document with this id exists
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The id cannot address a document
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("Store returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The store answered with a payload we could not read
    #[error("Undecodable store payload: {0}")]
    Decode(String),

    /// The store cannot be used at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Stable error kind for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::InvalidId(_) => "invalid_id",
            StoreError::Transport(_) => "transport",
            StoreError::Backend { .. } => "backend",
            StoreError::Decode(_) => "decode",
            StoreError::Unavailable(_) => "unavailable",
        }
    }
}

// == Service Error Enum ==
/// Anything that can make a student request fail.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The store call failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request body was not the expected JSON
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl ServiceError {
    /// Stable error kind for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Store(err) => err.kind(),
            ServiceError::MalformedBody(_) => "malformed_body",
        }
    }
}

// == Api Error ==
/// A failed operation, ready to be turned into an HTTP response.
#[derive(Error, Debug)]
#[error("{operation} failed: {cause}")]
pub struct ApiError {
    pub operation: Operation,
    pub locale: Locale,
    #[source]
    pub cause: ServiceError,
}

impl ApiError {
    pub fn new(operation: Operation, locale: Locale, cause: impl Into<ServiceError>) -> Self {
        Self {
            operation,
            locale,
            cause: cause.into(),
        }
    }

    /// HTTP status for this failure.
    ///
    /// Only an update of an unknown id is distinguished; every other
    /// failure is a 500.
    pub fn status(&self) -> StatusCode {
        match (&self.operation, &self.cause) {
            (Operation::Update, ServiceError::Store(StoreError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The fixed public message for this failure.
    pub fn public_message(&self) -> &'static str {
        if self.status() == StatusCode::NOT_FOUND {
            self.locale.not_found_message()
        } else {
            self.locale.failure_message(self.operation)
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                operation = self.operation.as_str(),
                kind = self.cause.kind(),
                error = %self.cause,
                "student request failed"
            );
        } else {
            warn!(
                operation = self.operation.as_str(),
                kind = self.cause.kind(),
                error = %self.cause,
                "student request rejected"
            );
        }

        let body = Json(ErrorResponse::new(self.public_message()));
        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Result of a store call.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of a request handler.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
