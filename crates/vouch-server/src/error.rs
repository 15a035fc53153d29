use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
use vouch_crypto::{KeyInitError, SignError};
use vouch_types::TypeError;

use crate::response::ErrorBody;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("user not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("key initialization failed: {0}")]
    KeyInit(#[from] KeyInitError),

    #[error("signing failed: {0}")]
    Sign(#[from] SignError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<TypeError> for ServerError {
    fn from(e: TypeError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::KeyInit(_) | Self::Sign(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to show a client. Server-side failures are not described.
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(m) | Self::Conflict(m) => m.clone(),
            Self::NotFound(_) => self.to_string(),
            _ => "Internal Server Error".to_string(),
        }
    }

    /// Attach the request path for the error envelope.
    pub fn at(self, path: impl Into<String>) -> ApiError {
        ApiError {
            error: self,
            path: path.into(),
        }
    }
}

/// A [`ServerError`] bound to the request path it occurred on.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServerError,
    pub path: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            error!(path = %self.path, error = %self.error, "request failed");
        }
        let body = ErrorBody::new(self.error.code(), self.error.public_message(), self.path);
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.at(String::new()).into_response()
    }
}
