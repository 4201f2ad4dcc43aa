//! Service configuration.

use std::time::Duration;

use cas_store::config::{optional, required};
use cas_store::{ConfigError, StoreConfig};

/// Deadline applied to every backend call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything the service needs to start, built once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `NATS_URL`.
    pub nats_url: String,
    pub store: StoreConfig,
    /// `CAS_REQUEST_TIMEOUT_MS`, default one second.
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let nats_url = required(&lookup, "NATS_URL")?;
        let store = StoreConfig::from_lookup(&lookup)?;
        let request_timeout = match optional(&lookup, "CAS_REQUEST_TIMEOUT_MS") {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            nats_url,
            store,
            request_timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        var: "CAS_REQUEST_TIMEOUT_MS",
        reason,
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero".into())),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(e) => Err(invalid(format!("{raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REDIS: [(&str, &str); 3] = [
        ("NATS_URL", "nats://localhost:4222"),
        ("STORAGE_DRIVER", "redis"),
        ("REDIS_URL", "redis://localhost"),
    ];

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&REDIS)).unwrap();
        assert_eq!(config.nats_url, "nats://localhost:4222");
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert_eq!(
            config.store,
            StoreConfig::Redis {
                url: "redis://localhost".into()
            }
        );
    }

    #[test]
    fn test_custom_timeout() {
        let mut vars = REDIS.to_vec();
        vars.push(("CAS_REQUEST_TIMEOUT_MS", "250"));
        let config = ServiceConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_bad_timeout() {
        for raw in ["0", "-5", "soon"] {
            let mut vars = REDIS.to_vec();
            vars.push(("CAS_REQUEST_TIMEOUT_MS", raw));
            let err = ServiceConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { var, .. } if var == "CAS_REQUEST_TIMEOUT_MS"),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn test_missing_nats_url() {
        let err = ServiceConfig::from_lookup(lookup(&REDIS[1..])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("NATS_URL"));
        assert_eq!(
            err.to_string(),
            "`NATS_URL`, a required environment variable was not set"
        );
    }

    #[test]
    fn test_store_errors_propagate() {
        let err = ServiceConfig::from_lookup(lookup(&[
            ("NATS_URL", "nats://localhost:4222"),
            ("STORAGE_DRIVER", "sqlite"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownDriver("sqlite".into()));
    }
}
