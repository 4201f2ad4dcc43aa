//! # CAS Service
//!
//! A content-addressable store served over a message bus.
//!
//! ## Overview
//!
//! Clients publish a blob on `conthesis.cas.store` and receive its 8-byte
//! pointer; they publish a pointer on `conthesis.cas.get` and receive the
//! stored bytes. Structured (JSON) blobs are canonicalized before hashing, so
//! logically equal documents share one pointer.
//!
//! - [`RequestHandler`] - store/get semantics, deadlines and soft-fail
//! - [`CasService`] - subscribe, serve concurrently, drain and close
//! - [`ServiceConfig`] - startup configuration from the environment
//!
//! ## Failure Model
//!
//! The wire carries no error codes. Every per-request failure (backend error,
//! timeout, oversized pointer) becomes an empty response and a `warn!` log
//! line. Only startup problems are surfaced as [`ServiceError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cas_service::{CasService, ServiceConfig};
//!
//! async fn example() {
//!     let config = ServiceConfig::from_env().unwrap();
//!     let service = CasService::connect(&config).await.unwrap();
//!     service.run(async { let _ = tokio::signal::ctrl_c().await; }).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod service;

pub use config::{ServiceConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::{Result, ServiceError};
pub use handler::RequestHandler;
pub use service::{CasService, ServeReport};

// Re-export component crates
pub use cas_bus as bus;
pub use cas_core as core;
pub use cas_store as store;
