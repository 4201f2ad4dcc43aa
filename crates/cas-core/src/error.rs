//! Error types for CAS core.

use thiserror::Error;

/// Errors that can occur when handling pointers.
///
/// Canonicalization and digest computation are total and never fail; only
/// parsing an externally supplied pointer can.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid pointer length: expected {expected} bytes, got {got}")]
    InvalidPointerLength { expected: usize, got: usize },

    #[error("invalid pointer hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
