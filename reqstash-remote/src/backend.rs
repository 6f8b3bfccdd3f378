//! Remote store backend implementation.

use async_trait::async_trait;
use reqstash_backend::{Backend, BackendError, BackendResult};
use reqstash_core::{Fingerprint, StoredValue};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Error;

const DEFAULT_NAME: &str = "remote";

/// HTTP key-value store backend based on the reqwest crate.
///
/// Every fingerprint maps to `{url}/{id}`. The base URL may be given with
/// or without a trailing slash.
///
/// Cloning is cheap: the underlying [`Client`] shares its connection pool.
#[derive(Clone, Debug)]
pub struct RemoteBackend {
    client: Client,
    base: Url,
    name: String,
}

impl RemoteBackend {
    /// Create new backend instance for the given store URL with a default client.
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        Self::builder().url(url).build()
    }

    /// Creates new RemoteBackend builder with default settings.
    #[must_use]
    pub fn builder() -> RemoteBackendBuilder {
        RemoteBackendBuilder::default()
    }

    /// Returns the base URL fingerprints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Returns the URL of the resource holding `id`.
    pub fn endpoint(&self, id: &Fingerprint) -> Result<Url, Error> {
        self.base
            .join(id.as_str())
            .map_err(|err| Error::InvalidUrl {
                url: format!("{}{}", self.base, id),
                reason: err.to_string(),
            })
    }

    async fn unexpected(response: Response) -> BackendError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        BackendError::UnexpectedStatus { status, body }
    }
}

/// Part of builder pattern implementation for RemoteBackend.
#[derive(Default)]
pub struct RemoteBackendBuilder {
    url: Option<String>,
    client: Option<Client>,
    name: Option<String>,
}

impl RemoteBackendBuilder {
    /// Set the store base URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Use a preconfigured HTTP client (timeouts, TLS, proxies, ...).
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set a custom name for this backend, used in diagnostics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Create new instance of the remote backend with passed settings.
    pub fn build(self) -> Result<RemoteBackend, Error> {
        let raw = self.url.ok_or(Error::MissingUrl)?;
        let base = parse_base_url(&raw)?;
        Ok(RemoteBackend {
            client: self.client.unwrap_or_default(),
            base,
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_owned()),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be used as a base URL".to_owned()));
    }
    // `Url::join` replaces the last segment unless the path ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl Backend for RemoteBackend {
    async fn read(&self, id: &Fingerprint) -> BackendResult<Option<Value>> {
        let url = self.endpoint(id)?;
        trace!(%url, "remote store read");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(Error::from)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(%id, "remote store miss");
                Ok(None)
            }
            status if status.is_success() => {
                let body = response.bytes().await.map_err(Error::from)?;
                let value = serde_json::from_slice(&body)?;
                debug!(%id, "remote store hit");
                Ok(Some(value))
            }
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn write(&self, id: &Fingerprint, value: &StoredValue) -> BackendResult<()> {
        let url = self.endpoint(id)?;
        trace!(%url, "remote store write");

        let response = self
            .client
            .post(url)
            .json(value)
            .send()
            .await
            .map_err(Error::from)?;

        if response.status().is_success() {
            debug!(%id, status = %response.status(), "remote store write accepted");
            Ok(())
        } else {
            Err(Self::unexpected(response).await)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqstash_core::RequestDescriptor;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let backend = RemoteBackend::new("http://store.local/cache").unwrap();
        assert_eq!(backend.base_url().as_str(), "http://store.local/cache/");

        let backend = RemoteBackend::new("http://store.local/cache/").unwrap();
        assert_eq!(backend.base_url().as_str(), "http://store.local/cache/");
    }

    #[test]
    fn test_endpoint_appends_fingerprint() {
        let backend = RemoteBackend::new("http://store.local/cache").unwrap();
        let id = Fingerprint::of(&RequestDescriptor::get("http://x/"));
        assert_eq!(
            backend.endpoint(&id).unwrap().as_str(),
            format!("http://store.local/cache/{id}")
        );
    }

    #[test]
    fn test_build_rejects_bad_urls() {
        assert!(matches!(
            RemoteBackend::builder().build(),
            Err(Error::MissingUrl)
        ));
        assert!(matches!(
            RemoteBackend::new("not a url"),
            Err(Error::InvalidUrl { .. })
        ));
        assert!(matches!(
            RemoteBackend::new("ftp://store.local/"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_custom_name() {
        let backend = RemoteBackend::builder()
            .url("http://store.local/")
            .name("sessions")
            .build()
            .unwrap();
        assert_eq!(backend.name(), "sessions");
    }
}
