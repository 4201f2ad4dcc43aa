//! In-memory implementation of the Storage trait.
//!
//! This is primarily for testing. It has the same semantics as the network
//! backends but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use cas_core::Pointer;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::traits::Storage;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<Vec<u8>, Bytes>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Whether an entry exists under `pointer`.
    pub async fn contains(&self, pointer: &Pointer) -> bool {
        self.entries.read().await.contains_key(pointer.as_bytes().as_slice())
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        self.ensure_open()?;
        let entries = self.entries.read().await;
        Ok(entries.get(pointer).cloned().unwrap_or_default())
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        self.ensure_open()?;
        let mut entries = self.entries.write().await;
        entries.insert(pointer.as_bytes().to_vec(), data);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
