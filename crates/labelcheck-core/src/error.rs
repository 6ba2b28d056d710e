//! Error types for labelcheck.

use thiserror::Error;

use crate::models::Endpoint;

/// Result type alias using labelcheck's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for labelcheck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A backend call returned a non-success status or failed in transport.
    ///
    /// `status` is `None` when no response was received (timeout, refused
    /// connection, malformed body).
    #[error("{endpoint} call failed{}: {message}", status_suffix(.status))]
    RemoteCall {
        endpoint: Endpoint,
        status: Option<u16>,
        message: String,
    },

    /// Required user input was blank
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Upload rejected by the extension check
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Verification attempted before any collection was bound
    #[error("No collection resolved for this session; ingest a primary document or select a collection")]
    MissingCollection,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {}", code),
        None => String::new(),
    }
}

impl Error {
    /// Build a `RemoteCall` error for a non-success HTTP status.
    pub fn remote_status(endpoint: Endpoint, status: u16, body: impl Into<String>) -> Self {
        Error::RemoteCall {
            endpoint,
            status: Some(status),
            message: body.into(),
        }
    }

    /// Build a `RemoteCall` error for a transport-level failure.
    pub fn remote_transport(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Error::RemoteCall {
            endpoint,
            status: None,
            message: message.into(),
        }
    }

    /// Endpoint that produced this error, if it came from a backend call.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Error::RemoteCall { endpoint, .. } => Some(*endpoint),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
