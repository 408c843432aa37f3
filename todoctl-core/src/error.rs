//! Structured error types for todoctl storage.
//!
//! Missing lists or todos are never errors: stores answer them with
//! `None` or a no-op. What remains are faults of the backend itself.

use thiserror::Error;

/// Storage backend failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connectivity or statement failure reported by the database driver
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
