//! # Router Error Types

use thiserror::Error;

/// Router operation errors
#[derive(Error, Debug)]
pub enum RouterError {
    /// `run` was called on a router whose bind failed
    #[error("Router is not bound to {address}")]
    NotBound { address: String },
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;
