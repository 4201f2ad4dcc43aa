//! Error types for the service.

use cas_bus::BusError;
use cas_store::{ConfigError, StoreError};
use thiserror::Error;

/// Errors that stop the service.
///
/// Per-request failures never show up here; they are soft-failed by the
/// request handler.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Message bus error.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
