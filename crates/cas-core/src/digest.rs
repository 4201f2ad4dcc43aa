//! The digest function: canonical bytes to pointer.
//!
//! SHAKE128 (FIPS 202) squeezed to [`POINTER_LEN`] bytes. Changing either the
//! hash family or the output length orphans every stored entry.

use bytes::Bytes;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake128;

use crate::canonical::canonicalize;
use crate::types::{Pointer, POINTER_LEN};

/// Compute the pointer for already-canonical bytes.
pub fn digest(data: &[u8]) -> Pointer {
    let mut hasher = Shake128::default();
    hasher.update(data);
    let mut reader = hasher.finalize_xof();
    let mut out = [0u8; POINTER_LEN];
    reader.read(&mut out);
    Pointer(out)
}

/// Canonicalize `data` and derive its pointer.
///
/// Returns the pointer together with the canonical bytes that must be stored
/// under it.
pub fn address(data: Bytes) -> (Pointer, Bytes) {
    let canonical = canonicalize(data);
    (digest(&canonical), canonical)
}
