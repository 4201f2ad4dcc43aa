//! Error types for the bus module.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// Could not establish the connection.
    #[error("connect error: {0}")]
    Connect(String),

    /// Subscribing to a subject failed.
    #[error("subscribe to {subject} failed: {reason}")]
    Subscribe { subject: String, reason: String },

    /// Publishing a message failed.
    #[error("publish to {subject} failed: {reason}")]
    Publish { subject: String, reason: String },

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Nobody is listening on the requested subject.
    #[error("no responders on {0}")]
    NoResponders(String),

    /// No reply arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The bus was closed.
    #[error("bus is closed")]
    Closed,
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
