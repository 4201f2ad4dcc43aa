//! Backend configuration and driver selection.
//!
//! Configuration is read once at startup into a [`StoreConfig`] value and
//! handed to [`open_backend`](crate::open_backend). Nothing below this layer
//! touches the environment.
//!
//! Environment variables:
//! - `STORAGE_DRIVER`: `redis` or `minio` (required)
//! - `REDIS_URL`: connection URL (required for `redis`)
//! - `MINIO_ENDPOINT`, `MINIO_KEY_ID`, `MINIO_ACCESS_KEY`: required for `minio`
//! - `MINIO_SSL`: `yes` to use TLS
//! - `MINIO_REGION`: optional region, also used when creating the bucket
//! - `MINIO_BUCKET`: optional bucket name (default `conthesis-cas`)

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Bucket used by the blob-store backend unless overridden.
pub const DEFAULT_BUCKET: &str = "conthesis-cas";

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// The storage driver selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Key-value backend.
    Redis,
    /// S3-compatible blob-store backend.
    Minio,
}

impl Driver {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Redis => "redis",
            Self::Minio => "minio",
        }
    }
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redis" => Ok(Self::Redis),
            "minio" => Ok(Self::Minio),
            other => Err(ConfigError::UnknownDriver(other.to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters for the blob-store backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    /// `host:port`, or a full URL with scheme.
    pub endpoint: String,
    pub key_id: String,
    pub access_key: String,
    /// Use TLS when `endpoint` carries no scheme.
    pub secure: bool,
    pub region: Option<String>,
    pub bucket: String,
}

impl ObjectStoreConfig {
    /// The endpoint as a URL.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.secure {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }

    /// The configured region, or [`DEFAULT_REGION`].
    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }
}

impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("endpoint", &self.endpoint)
            .field("key_id", &self.key_id)
            .field("access_key", &"<redacted>")
            .field("secure", &self.secure)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Backend configuration, one variant per driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Redis { url: String },
    Minio(ObjectStoreConfig),
}

impl StoreConfig {
    /// The driver this configuration selects.
    pub fn driver(&self) -> Driver {
        match self {
            Self::Redis { .. } => Driver::Redis,
            Self::Minio(_) => Driver::Minio,
        }
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let driver: Driver = required(&lookup, "STORAGE_DRIVER")?.parse()?;

        match driver {
            Driver::Redis => Ok(Self::Redis {
                url: required(&lookup, "REDIS_URL")?,
            }),
            Driver::Minio => Ok(Self::Minio(ObjectStoreConfig {
                endpoint: required(&lookup, "MINIO_ENDPOINT")?,
                key_id: required(&lookup, "MINIO_KEY_ID")?,
                access_key: required(&lookup, "MINIO_ACCESS_KEY")?,
                secure: optional(&lookup, "MINIO_SSL").as_deref() == Some("yes"),
                region: optional(&lookup, "MINIO_REGION"),
                bucket: optional(&lookup, "MINIO_BUCKET")
                    .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            })),
        }
    }
}

/// Fetch a required variable, treating empty as missing.
pub fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or(ConfigError::MissingVar(key))
}

/// Fetch an optional variable, treating empty as unset.
pub fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.is_empty())
}
