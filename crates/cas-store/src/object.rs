//! S3-compatible implementation of the Storage trait.
//!
//! The blob-store backend. Each entry is one object named by the URL-safe,
//! padding-free base64 of its pointer. Writes check for the object first and
//! only upload when it is missing; uploads carry a CRC32 checksum the server
//! verifies before accepting the object.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, ChecksumAlgorithm, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use cas_core::Pointer;

use crate::config::ObjectStoreConfig;
use crate::error::{Result, StoreError};
use crate::traits::Storage;

/// Upper bound for bucket provisioning at startup.
pub const PROVISION_TIMEOUT: Duration = Duration::from_secs(5);

/// Object name for a lookup key: URL-safe base64 without padding.
///
/// Lookup keys shorter than a pointer are encoded the same way, so they can
/// only ever miss.
pub fn object_key(pointer: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(pointer)
}

/// S3-compatible object store implementation.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    /// Build a client from `config` and make sure the bucket exists.
    pub async fn connect(config: &ObjectStoreConfig) -> Result<Self> {
        let credentials = Credentials::new(
            config.key_id.clone(),
            config.access_key.clone(),
            None,
            None,
            "cas-static",
        );
        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(config.endpoint_url())
            .region(Region::new(config.region_or_default().to_string()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let store = Self::from_client(Client::from_conf(sdk_config), config.bucket.clone());

        tokio::time::timeout(
            PROVISION_TIMEOUT,
            store.ensure_bucket(config.region.as_deref()),
        )
        .await
        .map_err(|_| StoreError::Timeout(PROVISION_TIMEOUT))??;

        tracing::info!(
            endpoint = %config.endpoint_url(),
            bucket = %config.bucket,
            "connected to object store"
        );
        Ok(store)
    }

    /// Wrap an existing client. The bucket is assumed to exist.
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// The bucket entries are stored in.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Create the bucket unless it already exists.
    async fn ensure_bucket(&self, region: Option<&str>) -> Result<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => return Ok(()),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {}
            Err(err) => return Err(sdk_error("head_bucket", err)),
        }

        let mut request = self.client.create_bucket().bucket(&self.bucket);
        if let Some(region) = region {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, "created bucket");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
            {
                Ok(())
            }
            Err(err) => Err(sdk_error("create_bucket", err)),
        }
    }
}

/// Flatten an SDK error, including its source chain, into a store error.
fn sdk_error<E, R>(op: &str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::ObjectStore(format!("{op}: {}", DisplayErrorContext(&err)))
}

#[async_trait]
impl Storage for ObjectStore {
    async fn get(&self, pointer: &[u8]) -> Result<Bytes> {
        // An empty key names no object; S3 would reject the request.
        if pointer.is_empty() {
            return Ok(Bytes::new());
        }
        let key = object_key(pointer);
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Ok(Bytes::new());
            }
            Err(err) => return Err(sdk_error("get_object", err)),
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::ObjectStore(format!("get_object body {key}: {e}")))?;
        Ok(body.into_bytes())
    }

    async fn put(&self, pointer: &Pointer, data: Bytes) -> Result<()> {
        let key = object_key(pointer.as_bytes());

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => {
                tracing::debug!(%pointer, "object already present, skipping upload");
                return Ok(());
            }
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {}
            Err(err) => return Err(sdk_error("head_object", err)),
        }

        let len = i64::try_from(data.len())
            .map_err(|_| StoreError::ObjectStore(format!("object too large: {} bytes", data.len())))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_length(len)
            .checksum_algorithm(ChecksumAlgorithm::Crc32)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| sdk_error("put_object", err))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "minio"
    }
}
