//! Storage trait: the abstract interface for blob persistence.
//!
//! This trait allows the request handler to be storage-agnostic.
//! Implementations include Redis, S3-compatible object stores, and in-memory
//! (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cas_core::Pointer;

use crate::error::Result;

/// The Storage trait: async interface for blob persistence.
///
/// # Design Notes
///
/// - **Absence is not an error**: `get` on an unknown pointer returns empty
///   bytes. An entry that was stored empty looks exactly the same.
/// - **Idempotent writes**: storing the same `(pointer, bytes)` twice leaves
///   the entry indistinguishable from a single store. Collisions are not
///   detected; a later write simply overwrites.
/// - **Concurrency**: implementations must accept any number of concurrent
///   `get`/`put` calls without external locking.
/// - **Cancellation**: callers bound each call with a deadline and may drop the
///   future; writes are atomic per key, so nothing needs cleaning up.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the bytes stored under `pointer`.
    ///
    /// `pointer` is the raw request body and may be shorter than a full
    /// pointer; such lookups simply miss.
    async fn get(&self, pointer: &[u8]) -> Result<Bytes>;

    /// Store `data` under `pointer`.
    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()>;

    /// Release backend resources. Safe to call more than once.
    async fn close(&self) -> Result<()>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        (**self).get(pointer).await
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        (**self).put(pointer, data).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Box<S> {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        (**self).get(pointer).await
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        (**self).put(pointer, data).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
