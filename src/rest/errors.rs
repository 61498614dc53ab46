//! Error classification for REST requests
//!
//! A herder failure is either a leader redirect (handled by forwarding), one
//! of the fixed [`RequestFailure`]s, or an unclassified error passed through.

use crate::common::Error;
use crate::coordinator::WaitError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Body of every error response: `{"error_code": 409, "message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error_code: u16,
    pub message: String,
}

/// Caller-visible failures with a fixed status and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFailure {
    /// The hop budget ran out while the leader was still elsewhere.
    RebalanceConflict,
    /// The herder's view of the group was stale.
    StaleConfig,
    /// The herder did not answer before the request deadline.
    Timeout,
    /// The herder abandoned the request.
    Interrupted,
}

impl RequestFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestFailure::RebalanceConflict | RequestFailure::StaleConfig => StatusCode::CONFLICT,
            RequestFailure::Timeout | RequestFailure::Interrupted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RequestFailure::RebalanceConflict => {
                "Cannot complete request because of a conflicting operation (e.g. worker rebalance)"
            }
            RequestFailure::StaleConfig => {
                "Cannot complete request momentarily due to stale configuration (typically caused by a concurrent config change)"
            }
            RequestFailure::Timeout => "Request timed out",
            RequestFailure::Interrupted => "Request interrupted",
        }
    }
}

/// Outcome of classifying a failed wait.
#[derive(Debug)]
pub enum Classified {
    /// The leader lives at this URL; the request may be forwarded there.
    Redirect(String),
    Failure(RequestFailure),
    Unclassified(Error),
}

pub fn classify(error: WaitError) -> Classified {
    match error {
        WaitError::TimedOut(_) => Classified::Failure(RequestFailure::Timeout),
        WaitError::Interrupted => Classified::Failure(RequestFailure::Interrupted),
        WaitError::Failed(Error::NotLeader(url)) => Classified::Redirect(url),
        WaitError::Failed(Error::RebalanceNeeded(_)) => {
            Classified::Failure(RequestFailure::StaleConfig)
        }
        WaitError::Failed(other) => Classified::Unclassified(other),
    }
}
