//! Error types for the CRM API client.
//!
//! # Design
//! `Authentication` gets a dedicated variant because a 401 has side effects
//! (the session is reset before the error reaches the caller). All other
//! non-2xx responses land in `Http` with the status and the message the
//! server supplied, or a synthesized `HTTP {status}: {statusText}`.

use thiserror::Error;

/// Errors returned by `RequestPipeline` and the resource wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 401. The session was already cleared.
    #[error("{message}")]
    Authentication { message: String },

    /// The server returned a non-2xx status other than 401.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The call failed below the HTTP layer, or a body declared as JSON
    /// could not be decoded.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A local store or download sink could not be read or written.
    #[error("storage failed: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication { .. })
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Storage(e.to_string())
    }
}
