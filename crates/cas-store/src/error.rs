//! Error types for the store module.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error from the Redis client.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Error from the S3-compatible object store.
    #[error("object store error: {0}")]
    ObjectStore(String),

    /// The operation did not complete within its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend was closed.
    #[error("store is closed")]
    Closed,
}

/// Errors raised while building backend configuration.
///
/// These are fatal: they surface once at startup, never per request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was absent or empty.
    #[error("`{0}`, a required environment variable was not set")]
    MissingVar(&'static str),

    /// The driver selector names no known backend.
    #[error("no such storage driver: {0:?}")]
    UnknownDriver(String),

    /// A setting was present but unusable.
    #[error("invalid value for `{var}`: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
