//! Error types for miniconnect

use crate::rest::errors::{ErrorMessage, RequestFailure};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Herder Errors ===
    /// The request must be served by the leader reachable at this URL.
    #[error("Not leader: forward request to {0}")]
    NotLeader(String),

    #[error("Rebalance needed: {0}")]
    RebalanceNeeded(String),

    #[error("Connector {0} not found")]
    NotFound(String),

    // === Request Errors ===
    #[error("{}", .0.message())]
    Request(RequestFailure),

    /// A forwarded request was answered with an error by the peer.
    #[error("{message}")]
    Peer { status: u16, message: String },

    // === Network Errors ===
    #[error("{0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Request(failure) => failure.status(),
            Error::Peer { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Error::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RequestFailure> for Error {
    fn from(failure: RequestFailure) -> Self {
        Error::Request(failure)
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.to_http_status();
        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), "Request failed: {}", self);
        } else {
            tracing::debug!(status = %status.as_u16(), "Request rejected: {}", self);
        }
        let body = ErrorMessage {
            error_code: status.as_u16(),
            message: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}
