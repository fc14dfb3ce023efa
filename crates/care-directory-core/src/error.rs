//! Error types for directory operations.

use thiserror::Error;

/// Result alias used by every store and validation operation.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Failure taxonomy for the directory.
///
/// Frontends map these onto their own surface: the HTTP server turns
/// `NotFound` into 404, `Validation` into 400 and `Internal` into 500.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    /// A record looked up by id or slug does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Input was rejected before it reached the store.
    #[error("invalid {0}")]
    Validation(String),

    /// Something that should not happen in normal operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DirectoryError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
