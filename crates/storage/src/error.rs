use graphlink_core::Error as CoreError;
use thiserror::Error;

/// Result type for graph store operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store could not be reached or did not answer; the operation had no effect
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// More than one existing relationship matched a get-or-create operation
    #[error("Ambiguous match for operation {index}: {matches} relationships match")]
    Ambiguous { index: usize, matches: usize },

    /// An operation referenced a node that does not exist
    #[error("Operation {index} references a node that does not exist")]
    MissingNode { index: usize },

    /// An operation was rejected before reaching the store
    #[error("Invalid operation {index}: {reason}")]
    InvalidOperation { index: usize, reason: String },

    #[error("Batch size exceeded: requested {requested}, max {max}")]
    BatchSizeExceeded { requested: usize, max: usize },

    /// The server rejected a statement
    #[error("Server error {code}: {message}")]
    Server { code: String, message: String },

    /// The server answered with something that could not be interpreted
    #[error("Unexpected response: {0}")]
    Protocol(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StorageError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidConfig(msg) => CoreError::config(msg),
            other => CoreError::storage(other.to_string()),
        }
    }
}
