//! # CAS Store
//!
//! Storage abstraction for the content-addressable store. Provides a
//! trait-based interface for blob persistence with Redis, S3-compatible and
//! in-memory implementations.
//!
//! ## Overview
//!
//! The request handler talks to storage only through the [`Storage`] trait.
//! Which backend sits behind it is decided once at startup from a
//! [`StoreConfig`] and fixed for the life of the process.
//!
//! ## Key Types
//!
//! - [`Storage`] - The async trait for get/put/close
//! - [`RedisStore`] - Key-value backend, keys are `cas:` + raw pointer bytes
//! - [`ObjectStore`] - S3/MinIO backend, object names are base64url pointers
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Backend`] - The driver chosen by configuration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cas_store::{open_backend, Storage, StoreConfig};
//! use cas_core::address;
//! use bytes::Bytes;
//!
//! async fn example() {
//!     let config = StoreConfig::from_env().unwrap();
//!     let backend = open_backend(&config).await.unwrap();
//!
//!     let (pointer, canonical) = address(Bytes::from_static(br#"{"x": 1}"#));
//!     backend.put(&pointer, canonical).await.unwrap();
//!     let data = backend.get(pointer.as_bytes()).await.unwrap();
//!     assert_eq!(&data[..], br#"{"x":1}"#);
//!
//!     backend.close().await.unwrap();
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod kv;
pub mod memory;
pub mod object;
pub mod traits;

pub use backend::{open_backend, Backend};
pub use config::{Driver, ObjectStoreConfig, StoreConfig, DEFAULT_BUCKET, DEFAULT_REGION};
pub use error::{ConfigError, Result, StoreError};
pub use kv::RedisStore;
pub use memory::MemoryStore;
pub use object::ObjectStore;
pub use traits::Storage;
