//! # CAS Core
//!
//! Pure primitives for the content-addressable store: pointers, the digest
//! function, and canonicalization.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over byte strings.
//!
//! ## Key Types
//!
//! - [`Pointer`] - 8-byte content address (SHAKE128 of the canonical form)
//! - [`canonicalize`] - Fail-open JSON canonicalization
//! - [`digest`] - The pointer derivation function
//!
//! ## Addressing
//!
//! ```rust
//! use bytes::Bytes;
//! use cas_core::{address, canonicalize, digest};
//!
//! let canonical = canonicalize(Bytes::from_static(br#"{"b": 2, "a": 1}"#));
//! assert_eq!(&canonical[..], br#"{"a":1,"b":2}"#);
//!
//! let (pointer, _) = address(Bytes::from_static(br#"{"a":1,"b":2}"#));
//! assert_eq!(pointer, digest(&canonical));
//! ```
//!
//! The pointer format (SHAKE128 squeezed to 8 bytes) is a durable contract:
//! every pointer ever handed out must keep resolving after a reimplementation.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod types;

pub use canonical::{canonicalize, is_structured};
pub use digest::{address, digest};
pub use error::CoreError;
pub use types::{is_valid_lookup_len, Pointer, POINTER_LEN};
