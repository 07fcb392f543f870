//! Error kinds surfaced by the routing engine and its RPC boundary.
//!
//! Every failure maps to a wire-level [`ErrorCode`] and an HTTP status, so a node
//! calling a neighbor sees the same kind of error the neighbor produced.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A required downstream call failed and no acceptable partial result exists.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// A team leader refused the request because `max_inflight` was reached.
    #[error("overloaded")]
    ResourceExhausted,

    /// A single outbound call did not complete within its deadline.
    #[error("deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Fatal startup problem: unreadable topology or unknown node identity.
    #[error("config error: {0}")]
    Config(String),

    /// A peer answered with something that could not be decoded.
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Wire representation of an error kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unavailable,
    ResourceExhausted,
    DeadlineExceeded,
    Config,
    Internal,
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Unavailable(_) => ErrorCode::Unavailable,
            Error::ResourceExhausted => ErrorCode::ResourceExhausted,
            Error::DeadlineExceeded(_) => ErrorCode::DeadlineExceeded,
            Error::Config(_) => ErrorCode::Config,
            Error::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            Error::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Config(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Rebuilds an error received from a peer.
    pub fn from_wire(code: ErrorCode, message: String) -> Self {
        match code {
            ErrorCode::Unavailable => Error::Unavailable(message),
            ErrorCode::ResourceExhausted => Error::ResourceExhausted,
            ErrorCode::DeadlineExceeded => Error::DeadlineExceeded(message),
            ErrorCode::Config => Error::Config(message),
            ErrorCode::Internal => Error::Internal(message),
        }
    }

    /// Message carried on the wire, without the kind prefix added by `Display`.
    pub fn message(&self) -> String {
        match self {
            Error::Unavailable(msg)
            | Error::DeadlineExceeded(msg)
            | Error::Config(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::ResourceExhausted => "overloaded".to_string(),
        }
    }
}
