use std::sync::Arc;

use async_trait::async_trait;
use reqstash_core::{Fingerprint, StoredValue};
use serde_json::Value;

use crate::BackendError;

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads the raw value stored under `id`.
    ///
    /// Returns `Ok(None)` when the store has no entry for `id`. The value is
    /// returned exactly as the store holds it, including any store-internal
    /// fields.
    async fn read(&self, id: &Fingerprint) -> BackendResult<Option<Value>>;

    /// Writes (or overwrites) the value stored under `id`.
    async fn write(&self, id: &Fingerprint, value: &StoredValue) -> BackendResult<()>;

    /// Returns the name of this backend for diagnostics.
    fn name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, id: &Fingerprint) -> BackendResult<Option<Value>> {
        (*self).read(id).await
    }

    async fn write(&self, id: &Fingerprint, value: &StoredValue) -> BackendResult<()> {
        (*self).write(id, value).await
    }

    fn name(&self) -> &str {
        (*self).name()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, id: &Fingerprint) -> BackendResult<Option<Value>> {
        (**self).read(id).await
    }

    async fn write(&self, id: &Fingerprint, value: &StoredValue) -> BackendResult<()> {
        (**self).write(id, value).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend> {
    async fn read(&self, id: &Fingerprint) -> BackendResult<Option<Value>> {
        (**self).read(id).await
    }

    async fn write(&self, id: &Fingerprint, value: &StoredValue) -> BackendResult<()> {
        (**self).write(id, value).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
