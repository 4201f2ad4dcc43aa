//! Request handling: store and get with soft-fail responses.
//!
//! Every failure degrades to an empty response. Diagnosis lives in the logs
//! only, keyed by operation and pointer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use cas_bus::{BusMessage, GET_SUBJECT, STORE_SUBJECT};
use cas_core::{address, is_valid_lookup_len};
use cas_store::{Storage, StoreError};

use crate::config::DEFAULT_REQUEST_TIMEOUT;

/// Turns request bodies into response bodies against one storage backend.
pub struct RequestHandler<S: Storage + ?Sized> {
    storage: Arc<S>,
    timeout: Duration,
}

impl<S: Storage + ?Sized> Clone for RequestHandler<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            timeout: self.timeout,
        }
    }
}

impl<S: Storage + ?Sized> RequestHandler<S> {
    /// Create a handler whose backend calls are bounded by `timeout`.
    pub fn new(storage: Arc<S>, timeout: Duration) -> Self {
        Self { storage, timeout }
    }

    /// Create a handler with the default one-second deadline.
    pub fn with_default_timeout(storage: Arc<S>) -> Self {
        Self::new(storage, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Canonicalize, address and persist `data`.
    ///
    /// Responds with the 8-byte pointer, or empty if the backend failed.
    pub async fn store(&self, data: Bytes) -> Bytes {
        let (pointer, canonical) = address(data);
        let len = canonical.len();

        match self.bounded(self.storage.put(&pointer, canonical)).await {
            Ok(()) => {
                tracing::debug!(op = "store", %pointer, len, "stored");
                Bytes::copy_from_slice(pointer.as_bytes())
            }
            Err(err) => {
                tracing::warn!(op = "store", %pointer, error = %err, "store failed");
                Bytes::new()
            }
        }
    }

    /// Look up the bytes stored under `pointer`.
    ///
    /// Oversized pointers are rejected without touching the backend. Misses
    /// and backend failures both respond empty.
    pub async fn get(&self, pointer: &[u8]) -> Bytes {
        if !is_valid_lookup_len(pointer.len()) {
            tracing::warn!(
                op = "get",
                len = pointer.len(),
                pointer = %hex::encode(pointer),
                "pointer too long"
            );
            return Bytes::new();
        }

        match self.bounded(self.storage.get(pointer)).await {
            Ok(data) => {
                tracing::debug!(op = "get", pointer = %hex::encode(pointer), len = data.len(), "fetched");
                data
            }
            Err(err) => {
                tracing::warn!(
                    op = "get",
                    pointer = %hex::encode(pointer),
                    error = %err,
                    "get failed"
                );
                Bytes::new()
            }
        }
    }

    /// Dispatch a bus message by subject.
    ///
    /// Returns the response body, or `None` for subjects this handler does
    /// not serve.
    pub async fn handle(&self, message: &BusMessage) -> Option<Bytes> {
        match message.subject.as_str() {
            STORE_SUBJECT => Some(self.store(message.payload.clone()).await),
            GET_SUBJECT => Some(self.get(&message.payload).await),
            other => {
                tracing::debug!(subject = other, "ignoring message on unknown subject");
                None
            }
        }
    }

    async fn bounded<T, F>(&self, call: F) -> cas_store::Result<T>
    where
        F: Future<Output = cas_store::Result<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}
