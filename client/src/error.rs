//! Error types for the client sync layer.

use thiserror::Error;

/// Errors from talking to the todo API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced an HTTP response (connection refused,
    /// timeout, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The server's `error` message, or the status reason if none was sent
        message: String,
    },

    /// A 2xx response whose body did not match the expected envelope.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status, if the server produced one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
