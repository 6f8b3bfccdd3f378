//! Client configuration.
//!
//! [`Config`] is the resolved record a [`StoreClient`](crate::StoreClient)
//! is built from: where the store lives and how hard to retry the upstream.
//! It can be assembled in code with [`Config::builder`] or read from YAML:
//!
//! ```
//! use std::time::Duration;
//! use reqstash::Config;
//!
//! let config = Config::from_yaml(
//!     r#"
//!     storeUrl: http://127.0.0.1:8080/cache
//!     retry: 2
//!     retryDelay: 250ms
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.retry, 2);
//! assert_eq!(config.retry_delay, Duration::from_millis(250));
//! ```
//!
//! `retry` and `retryDelay` default to zero: a single attempt, no waiting.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::fetch::RetryPolicy;

/// Resolved client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the key-value store (e.g., "http://127.0.0.1:8080/cache").
    #[serde(alias = "url", alias = "store_url")]
    pub store_url: String,
    /// Retries after the first failed attempt.
    #[serde(default)]
    pub retry: u32,
    /// Fixed wait between attempts (e.g., "100ms", "2s").
    #[serde(default, with = "humantime_serde", alias = "retry_delay")]
    pub retry_delay: Duration,
}

impl Config {
    /// Creates a new [`ConfigBuilder`].
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let config: Config =
            serde_saphyr::from_str(yaml).map_err(|err| Error::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the store URL is an absolute http(s) URL with a host.
    pub fn validate(&self) -> Result<(), Error> {
        let raw = self.store_url.trim();
        if raw.is_empty() {
            return Err(Error::InvalidConfig("store URL is empty".to_owned()));
        }
        let url = Url::parse(raw)
            .map_err(|err| Error::InvalidConfig(format!("store URL {raw:?}: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "store URL {raw:?} must use http or https"
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::InvalidConfig(format!("store URL {raw:?} has no host")));
        }
        Ok(())
    }

    /// Returns the retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.retry, self.retry_delay)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    store_url: Option<String>,
    retry: u32,
    retry_delay: Duration,
}

impl ConfigBuilder {
    /// Sets the store base URL.
    pub fn store_url(mut self, url: impl Into<String>) -> Self {
        self.store_url = Some(url.into());
        self
    }

    /// Sets the number of retries after the first failed attempt.
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the fixed wait between attempts.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<Config, Error> {
        let config = Config {
            store_url: self
                .store_url
                .ok_or_else(|| Error::InvalidConfig("store URL not specified".to_owned()))?,
            retry: self.retry,
            retry_delay: self.retry_delay,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_retry() {
        let config = Config::from_yaml("storeUrl: http://store.local/").unwrap();
        assert_eq!(config.retry, 0);
        assert_eq!(config.retry_delay, Duration::ZERO);
        assert_eq!(config.retry_policy(), RetryPolicy::none());
    }

    #[test]
    fn test_accepts_snake_case_key_names() {
        let config = Config::from_yaml(
            r#"
            url: http://store.local/cache
            retry: 3
            retry_delay: 1s
            "#,
        )
        .unwrap();
        assert_eq!(config.store_url, "http://store.local/cache");
        assert_eq!(config.retry_policy().attempts(), 4);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_bad_store_urls() {
        assert!(matches!(
            Config::from_yaml("storeUrl: ''"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_yaml("storeUrl: ftp://store.local/"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_yaml("retry: 2"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::builder().store_url("http://").build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_unparseable_store_urls() {
        for raw in ["http://exa mple/", "http://[::1/", "http//store.local"] {
            assert!(
                matches!(
                    Config::builder().store_url(raw).build(),
                    Err(Error::InvalidConfig(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .store_url("https://store.local")
            .retry(2)
            .retry_delay(Duration::from_millis(10))
            .build()
            .unwrap();
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::fixed(2, Duration::from_millis(10))
        );
        assert!(matches!(
            Config::builder().build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_serializes_human_durations() {
        let config = Config::builder()
            .store_url("http://store.local")
            .retry_delay(Duration::from_millis(250))
            .build()
            .unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["retryDelay"], "250ms");
        assert_eq!(value["storeUrl"], "http://store.local");
    }
}
