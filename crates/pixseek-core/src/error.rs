//! Error types for pixseek

use thiserror::Error;

/// Result type alias for pixseek operations
pub type Result<T> = std::result::Result<T, PixseekError>;

/// Main error type for pixseek
#[derive(Error, Debug)]
pub enum PixseekError {
    /// Query vector dimension disagrees with the feature space's dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Index error
    #[error("Index error: {0}")]
    IndexError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
