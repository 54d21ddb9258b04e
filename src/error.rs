//! Error types for the response cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Storage Error Enum ==
/// Failure raised by a storage collaborator or while preparing a value for it.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Writing the item would push the store past its capacity
    #[error("Quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// The payload could not be serialized for storage
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing medium rejected the write
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// == Fetch Error Enum ==
/// Failure reported to a request's error handler.
///
/// Caching never produces one of these on its own; they come from the
/// underlying transport.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The transport completed with a non-success status
    #[error("Request failed with status {status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// The transport could not reach the remote end
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not match the declared response kind
    #[error("Response could not be parsed as {0}")]
    Parse(String),

    /// The request was aborted before a completion arrived
    #[error("Request was cancelled")]
    Cancelled,
}

// == Result Type Alias ==
/// Convenience Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
