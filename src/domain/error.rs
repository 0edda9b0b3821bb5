//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the layout engine's preconditions.
/// These are independent of I/O and configuration loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, DomainError>;
