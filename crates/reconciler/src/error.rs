//! Error types for relationship reconciliation

use graphlink_core::Error as CoreError;
use graphlink_storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Errors that can occur while reconciling or querying relationships
///
/// Every failure applies to the whole call: no partial results are returned
/// and the store keeps nothing the failed call would have created.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A specification was rejected before the store was contacted
    #[error("Invalid specification at index {index}: {reason}")]
    InvalidSpecification { index: usize, reason: String },

    /// The store could not be reached; retrying the same call is safe
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// More than one existing relationship matched the specification at `index`
    #[error("Ambiguous match at index {index}: {matches} relationships match")]
    AmbiguousMatch { index: usize, matches: usize },

    /// Any other failure reported by the store
    #[error(transparent)]
    Store(StorageError),

    /// A value could not be converted to or from node properties
    #[error("Mapping error: {0}")]
    Mapping(String),
}

impl From<StorageError> for ReconcileError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StorageError::Ambiguous { index, matches } => Self::AmbiguousMatch { index, matches },
            StorageError::InvalidOperation { index, reason } => {
                Self::InvalidSpecification { index, reason }
            }
            other => Self::Store(other),
        }
    }
}

impl ReconcileError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Rewrite the operation index carried by the error
    pub(crate) fn map_index(self, f: impl Fn(usize) -> usize) -> Self {
        match self {
            Self::InvalidSpecification { index, reason } => Self::InvalidSpecification {
                index: f(index),
                reason,
            },
            Self::AmbiguousMatch { index, matches } => Self::AmbiguousMatch {
                index: f(index),
                matches,
            },
            Self::Store(StorageError::MissingNode { index }) => {
                Self::Store(StorageError::MissingNode { index: f(index) })
            }
            other => other,
        }
    }
}

impl From<ReconcileError> for CoreError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::InvalidSpecification { .. } | ReconcileError::Mapping(_) => {
                CoreError::invalid_input(err.to_string())
            }
            ReconcileError::Store(store_err) => store_err.into(),
            other => CoreError::storage(other.to_string()),
        }
    }
}
