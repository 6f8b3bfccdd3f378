//! The caching client.

use std::sync::Arc;

use reqstash_backend::Backend;
use reqstash_core::{
    CACHED_FIELD, Envelope, Fingerprint, REQUEST_ID_FIELD, RequestDescriptor, StoredValue,
    Transport,
};
use serde_json::Value;
use tracing::{Span, debug, field, instrument};

use crate::config::Config;
use crate::error::Error;
use crate::fetch::RetryPolicy;

/// Caching proxy client.
///
/// `StoreClient` fingerprints each request, looks the fingerprint up in the
/// store and only goes to the upstream on a miss. Results come back as an
/// [`Envelope`] either way; fresh results can be handed to
/// [`store`](StoreClient::store) to persist them.
///
/// # Type Parameters
///
/// * `B` - Store backend (e.g., `RemoteBackend`, `MemoryBackend`)
/// * `T` - Outbound transport (e.g., `ReqwestTransport`)
///
/// Cloning is cheap and clones share the backend and transport. Concurrent
/// calls share no other state: two callers racing on the same fingerprint
/// may both fetch and both store, and the last write wins.
pub struct StoreClient<B, T> {
    backend: Arc<B>,
    transport: Arc<T>,
    retry: RetryPolicy,
}

impl<B, T> Clone for StoreClient<B, T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            transport: Arc::clone(&self.transport),
            retry: self.retry,
        }
    }
}

impl<B, T> std::fmt::Debug for StoreClient<B, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("backend", &std::any::type_name::<B>())
            .field("transport", &std::any::type_name::<T>())
            .field("retry", &self.retry)
            .finish()
    }
}

/// Marker type for unset builder fields.
///
/// When you see `NotSet` in a compiler error, it means you haven't called
/// the corresponding builder method yet.
pub struct NotSet;

impl StoreClient<NotSet, NotSet> {
    /// Creates a new [`StoreClientBuilder`].
    pub fn builder() -> StoreClientBuilder<NotSet, NotSet> {
        StoreClientBuilder {
            backend: NotSet,
            transport: NotSet,
            retry: RetryPolicy::none(),
        }
    }
}

#[cfg(all(feature = "remote", feature = "reqwest"))]
impl StoreClient<reqstash_remote::RemoteBackend, reqstash_reqwest::ReqwestTransport> {
    /// Creates a client talking to the store at `config.store_url` and to
    /// upstreams through a default reqwest client.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        config.validate()?;
        let backend = reqstash_remote::RemoteBackend::new(config.store_url.as_str())?;
        Ok(Self::new(
            backend,
            reqstash_reqwest::ReqwestTransport::new(),
            config,
        ))
    }
}

impl<B, T> StoreClient<B, T>
where
    B: Backend,
    T: Transport,
{
    /// Creates a client from a backend, a transport and a configuration.
    pub fn new(backend: B, transport: T, config: &Config) -> Self {
        Self {
            backend: Arc::new(backend),
            transport: Arc::new(transport),
            retry: config.retry_policy(),
        }
    }

    /// Returns the store backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the outbound transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the retry policy applied to upstream requests.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Computes the store key for a descriptor.
    pub fn fingerprint(&self, descriptor: &RequestDescriptor) -> Fingerprint {
        Fingerprint::of(descriptor)
    }

    /// Looks `id` up in the store.
    ///
    /// A missing entry is `Ok(None)`. Any other store failure is an
    /// [`Error::StoreLookup`] and is not retried.
    pub async fn lookup(&self, id: &Fingerprint) -> Result<Option<StoredValue>, Error> {
        debug!(%id, backend = self.backend.name(), "store lookup");
        let raw = self
            .backend
            .read(id)
            .await
            .map_err(|source| Error::StoreLookup {
                id: id.clone(),
                source,
            })?;
        Ok(raw.map(StoredValue::from_store))
    }

    /// Answers a request from the store, or from the upstream on a miss.
    ///
    /// The lookup always happens before any upstream call. Fetch failures
    /// are retried according to the configured policy and surfaced as
    /// [`Error::FetchExhausted`] once the budget is spent.
    #[instrument(name = "reqstash.request", skip_all, fields(request_id = field::Empty))]
    pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<Envelope, Error> {
        let id = self.fingerprint(descriptor);
        Span::current().record("request_id", field::display(&id));
        debug!(url = ?descriptor.request_url(), "request");

        if let Some(value) = self.lookup(&id).await? {
            debug!("use cached data");
            return Ok(Envelope::from_store(id, value));
        }

        let response = self
            .retry
            .fetch(self.transport.as_ref(), descriptor)
            .await?;

        debug!(status = %response.status, "use online data");
        Ok(Envelope::fresh(id, response.payload()))
    }

    /// Persists a freshly fetched envelope under its own fingerprint.
    ///
    /// Cached envelopes are already in the store and are skipped without
    /// any network traffic. The injected `requestId` and `cached` fields
    /// are never written.
    #[instrument(name = "reqstash.store", skip_all, fields(request_id = %envelope.request_id()))]
    pub async fn store(&self, envelope: &Envelope) -> Result<(), Error> {
        if envelope.is_cached() {
            debug!("skip store of cached data");
            return Ok(());
        }
        self.write(envelope.request_id(), &envelope.to_stored()).await
    }

    /// Persists a raw JSON envelope, as returned by serializing an [`Envelope`].
    ///
    /// A value with `cached: true` is skipped. Otherwise the value must
    /// carry a valid `requestId`.
    pub async fn store_value(&self, value: Value) -> Result<(), Error> {
        let Value::Object(mut payload) = value else {
            return Err(Error::MissingRequestId);
        };
        if payload.get(CACHED_FIELD) == Some(&Value::Bool(true)) {
            debug!("skip store of cached data");
            return Ok(());
        }
        let id: Fingerprint = match payload.remove(REQUEST_ID_FIELD) {
            Some(Value::String(raw)) => raw.parse().map_err(|_| Error::MissingRequestId)?,
            _ => return Err(Error::MissingRequestId),
        };
        self.write(&id, &StoredValue::new(payload)).await
    }

    async fn write(&self, id: &Fingerprint, value: &StoredValue) -> Result<(), Error> {
        debug!(%id, backend = self.backend.name(), "store write");
        self.backend
            .write(id, value)
            .await
            .map_err(|source| Error::StoreWrite {
                id: id.clone(),
                source,
            })
    }
}

/// Builder for [`StoreClient`].
///
/// Use [`StoreClient::builder()`] to create a new builder.
pub struct StoreClientBuilder<B, T> {
    backend: B,
    transport: T,
    retry: RetryPolicy,
}

impl<B, T> StoreClientBuilder<B, T> {
    /// Sets the store backend.
    pub fn backend<NewB>(self, backend: NewB) -> StoreClientBuilder<NewB, T> {
        StoreClientBuilder {
            backend,
            transport: self.transport,
            retry: self.retry,
        }
    }

    /// Sets the outbound transport.
    pub fn transport<NewT>(self, transport: NewT) -> StoreClientBuilder<B, NewT> {
        StoreClientBuilder {
            backend: self.backend,
            transport,
            retry: self.retry,
        }
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl<B, T> StoreClientBuilder<B, T>
where
    B: Backend,
    T: Transport,
{
    /// Builds the client.
    pub fn build(self) -> StoreClient<B, T> {
        StoreClient {
            backend: Arc::new(self.backend),
            transport: Arc::new(self.transport),
            retry: self.retry,
        }
    }
}
