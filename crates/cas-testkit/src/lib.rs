//! # CAS Testkit
//!
//! Testing utilities for the content-addressable store.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known inputs with expected canonical bytes and pointers
//! - **Generators**: Proptest strategies for blobs, pointers and JSON documents
//! - **Fixtures**: Storage stubs that record, fail, stall or forbid calls
//!
//! ## Golden Vectors
//!
//! ```rust
//! use cas_testkit::vectors::{all_vectors, verify_vector};
//!
//! for vector in all_vectors() {
//!     verify_vector(&vector).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cas_testkit::generators::json_renderings;
//!
//! proptest! {
//!     #[test]
//!     fn rendering_is_irrelevant((compact, pretty) in json_renderings()) {
//!         // compact and pretty must share one pointer
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{FailingStore, RecordingStore, SlowStore, UnreachableStore};
pub use vectors::{all_vectors, verify_all_vectors, verify_vector, GoldenVector};
