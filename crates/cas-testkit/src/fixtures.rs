//! Storage stubs for handler and service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cas_core::Pointer;
use cas_store::{Result, Storage, StoreError};

/// Counts calls before forwarding them to an inner store.
pub struct RecordingStore<S> {
    inner: S,
    gets: AtomicUsize,
    puts: AtomicUsize,
    closes: AtomicUsize,
}

impl<S: Storage> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: Storage> Storage for RecordingStore<S> {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(pointer).await
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(pointer, data).await
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Fails every get and put.
#[derive(Debug, Default)]
pub struct FailingStore;

impl FailingStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for FailingStore {
    async fn get(&self, _pointer: &[u8]) -> Result<Bytes> {
        Err(StoreError::ObjectStore("injected get failure".into()))
    }

    async fn put(&self, _pointer: &Pointer, _data: Bytes) -> Result<()> {
        Err(StoreError::ObjectStore("injected put failure".into()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Delays every get and put before forwarding.
pub struct SlowStore<S> {
    inner: S,
    delay: Duration,
}

impl<S: Storage> SlowStore<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Storage> Storage for SlowStore<S> {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(pointer).await
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(pointer, data).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Panics if the backend is reached at all.
#[derive(Debug, Default)]
pub struct UnreachableStore;

#[async_trait]
impl Storage for UnreachableStore {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        panic!("backend get reached with {} byte pointer", pointer.len());
    }

    async fn put(&self, pointer: &Pointer, _data: Bytes) -> Result<()> {
        panic!("backend put reached for {pointer}");
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}
