//! Error types for the store, the mutation engine and the client session.

use crate::types::NodeId;
use thiserror::Error;

/// Errors raised by a [`crate::store::NodeStore`] implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Domain errors raised at the mutation engine boundary and surfaced to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, rejected before any store access
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Referenced id does not resolve to an existing record
    #[error("{0}")]
    NotFound(String),

    /// Structurally disallowed action, such as adding a child under a file
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Persistence failed mid-operation
    #[error("Store failure: {0}")]
    StoreFailure(StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Request never produced a response (connection, decode)
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Error response from the server that has no local counterpart
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// Stable kind tag carried in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::NotFound(_) => "NotFound",
            ApiError::InvalidOperation(_) => "InvalidOperation",
            ApiError::StoreFailure(_) => "StoreFailure",
            ApiError::ConfigError(_) => "ConfigError",
            ApiError::Transport(_) => "Transport",
            ApiError::Timeout(_) => "Timeout",
            ApiError::Server { .. } => "Server",
        }
    }

    /// HTTP status the transport layer maps this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) | ApiError::InvalidOperation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Timeout(_) => 504,
            ApiError::Transport(_) => 502,
            ApiError::Server { status, .. } => *status,
            ApiError::StoreFailure(_) | ApiError::ConfigError(_) => 500,
        }
    }

    /// Message without the kind prefix.
    pub fn detail(&self) -> String {
        match self {
            ApiError::ValidationError(m)
            | ApiError::NotFound(m)
            | ApiError::InvalidOperation(m)
            | ApiError::ConfigError(m)
            | ApiError::Transport(m) => m.clone(),
            ApiError::StoreFailure(e) => e.to_string(),
            ApiError::Timeout(ms) => format!("{} ms", ms),
            ApiError::Server { message, .. } => message.clone(),
        }
    }

    /// Rebuild a domain error from a server error response.
    pub fn from_response(status: u16, kind: Option<&str>, message: String) -> Self {
        match kind {
            Some("ValidationError") => ApiError::ValidationError(message),
            Some("NotFound") => ApiError::NotFound(message),
            Some("InvalidOperation") => ApiError::InvalidOperation(message),
            _ => ApiError::Server { status, message },
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => ApiError::NotFound(format!("Node not found: {}", id)),
            other => ApiError::StoreFailure(other),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_not_found() {
        let err: ApiError = StorageError::NotFound(NodeId::from("n1")).into();
        assert_eq!(err.to_string(), "Node not found: n1");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn other_storage_errors_map_to_store_failure() {
        let err: ApiError = StorageError::Unavailable("disk gone".to_string()).into();
        assert!(matches!(err, ApiError::StoreFailure(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn response_round_trip_preserves_kind() {
        let original = ApiError::InvalidOperation("Cannot add items to a file".to_string());
        let rebuilt = ApiError::from_response(
            original.status_code(),
            Some(original.kind()),
            original.detail(),
        );
        assert!(matches!(rebuilt, ApiError::InvalidOperation(ref m) if m == "Cannot add items to a file"));
    }

    #[test]
    fn unknown_kind_becomes_server_error() {
        let err = ApiError::from_response(500, Some("StoreFailure"), "boom".to_string());
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
    }
}
