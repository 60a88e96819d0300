//! Error types for the chocbot core
//!
//! We use `thiserror` for ergonomic error definitions with automatic
//! Display/Error implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for ledger and quiz operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// IO errors from the ledger's backing file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid quiz parameters (empty or inverted ranges)
    #[error("Invalid quiz parameters: {0}")]
    InvalidParams(String),
}
