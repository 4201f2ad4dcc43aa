//! Strong type definitions for CAS addressing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::fmt;

use crate::error::CoreError;

/// Length of a pointer in bytes. Part of the wire contract.
pub const POINTER_LEN: usize = 8;

/// An 8-byte content address, computed as SHAKE128(canonical form).
///
/// Two blobs with the same canonical form always have the same Pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer(pub [u8; POINTER_LEN]);

impl Pointer {
    /// Create a new Pointer from raw bytes.
    pub const fn from_bytes(bytes: [u8; POINTER_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; POINTER_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)?;
        Self::try_from(bytes.as_slice())
    }

    /// URL-safe, padding-free base64 of the raw bytes.
    ///
    /// This is the object name used by the blob-store backend.
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }
}

/// Whether a get request body of `len` bytes may be looked up.
///
/// Anything longer than a pointer is malformed and never reaches a backend.
/// Shorter bodies are forwarded and simply miss.
pub const fn is_valid_lookup_len(len: usize) -> bool {
    len <= POINTER_LEN
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({})", self.to_hex())
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Pointer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; POINTER_LEN]> for Pointer {
    fn from(bytes: [u8; POINTER_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Pointer {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; POINTER_LEN] =
            slice
                .try_into()
                .map_err(|_| CoreError::InvalidPointerLength {
                    expected: POINTER_LEN,
                    got: slice.len(),
                })?;
        Ok(Self(arr))
    }
}
