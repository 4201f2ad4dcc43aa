//! Driver dispatch: one concrete backend chosen at startup.

use async_trait::async_trait;
use bytes::Bytes;
use cas_core::Pointer;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::kv::RedisStore;
use crate::object::ObjectStore;
use crate::traits::Storage;

/// The backend selected by [`StoreConfig`].
///
/// Exactly one driver is active per process; the variant is fixed for the
/// lifetime of the service.
#[derive(Debug)]
pub enum Backend {
    Redis(RedisStore),
    Minio(ObjectStore),
}

/// Connect the backend described by `config`.
///
/// Connection or provisioning failures are fatal to startup.
pub async fn open_backend(config: &StoreConfig) -> Result<Backend> {
    tracing::info!(driver = %config.driver(), "opening storage backend");
    match config {
        StoreConfig::Redis { url } => Ok(Backend::Redis(RedisStore::connect(url).await?)),
        StoreConfig::Minio(minio) => Ok(Backend::Minio(ObjectStore::connect(minio).await?)),
    }
}

#[async_trait]
impl Storage for Backend {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        match self {
            Self::Redis(store) => store.get(pointer).await,
            Self::Minio(store) => store.get(pointer).await,
        }
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        match self {
            Self::Redis(store) => store.put(pointer, data).await,
            Self::Minio(store) => store.put(pointer, data).await,
        }
    }

    async fn close(&self) -> Result<()> {
        match self {
            Self::Redis(store) => store.close().await,
            Self::Minio(store) => store.close().await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Redis(store) => store.name(),
            Self::Minio(store) => store.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_open_backend_bad_redis_url() {
        let config = StoreConfig::Redis {
            url: "definitely not a url".into(),
        };
        let err = open_backend(&config).await.err().unwrap();
        assert!(matches!(err, StoreError::Redis(_)));
    }
}
