//! Redis implementation of the Storage trait.
//!
//! The key-value backend. Entries live under `cas:` followed by the raw
//! pointer bytes; values are the canonical bytes themselves. The connection is
//! a multiplexed, auto-reconnecting [`ConnectionManager`], so a single handle
//! serves every concurrent request.

use async_trait::async_trait;
use bytes::Bytes;
use cas_core::Pointer;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::traits::Storage;

/// Namespace prefix for every key this store writes.
pub const KEY_PREFIX: &[u8] = b"cas:";

/// Build the Redis key for a pointer: `cas:` followed by the raw bytes.
pub fn cas_key(pointer: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(KEY_PREFIX.len() + pointer.len());
    key.extend_from_slice(KEY_PREFIX);
    key.extend_from_slice(pointer);
    key
}

/// A nil reply is a miss, which reads as empty bytes.
fn value_or_empty(reply: Option<Vec<u8>>) -> Bytes {
    reply.map(Bytes::from).unwrap_or_default()
}

/// Redis-based store implementation.
pub struct RedisStore {
    /// `None` once the store has been closed.
    conn: RwLock<Option<ConnectionManager>>,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to the Redis server at `url` (`redis://` or `rediss://`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        tracing::info!(addr = %client.get_connection_info().addr, "connected to redis");
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection manager.
    pub fn from_connection(conn: ConnectionManager) -> Self {
        Self {
            conn: RwLock::new(Some(conn)),
        }
    }

    /// Clone the shared connection handle.
    ///
    /// Cloning is cheap; all clones multiplex over the same connection.
    async fn connection(&self) -> Result<ConnectionManager> {
        self.conn.read().await.clone().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl Storage for RedisStore {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        let mut conn = self.connection().await?;
        let reply: Option<Vec<u8>> = conn.get(cas_key(pointer)).await?;
        Ok(value_or_empty(reply))
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(cas_key(pointer.as_bytes()), data.as_ref())
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.conn.write().await.take().is_some() {
            tracing::info!("redis connection closed");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
