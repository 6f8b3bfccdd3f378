//! Shared test doubles for client tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use http::StatusCode;
use reqstash::{
    Backend, BackendError, BackendResult, Fingerprint, RequestDescriptor, StoredValue, Transport,
    TransportError, TransportResponse,
};
use serde_json::Value;

/// What a scripted transport answers on one call.
#[derive(Clone, Debug)]
pub enum Reply {
    Status(u16, &'static str),
    Refused,
}

impl Reply {
    pub fn ok(body: &'static str) -> Self {
        Reply::Status(200, body)
    }
}

/// Transport replaying a script of replies; the last one repeats forever.
pub struct ScriptedTransport {
    script: Vec<Reply>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Reply>) -> Self {
        assert!(!script.is_empty(), "script needs at least one reply");
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: Reply) -> Self {
        Self::new(vec![reply])
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        _request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            calls.len() - 1
        };
        match self.script[index.min(self.script.len() - 1)].clone() {
            Reply::Status(status, body) => Ok(TransportResponse::new(
                StatusCode::from_u16(status).unwrap(),
                body,
            )),
            Reply::Refused => Err(TransportError::Connect("connection refused".into())),
        }
    }
}

/// Backend whose reads and writes always fail.
#[derive(Default)]
pub struct BrokenBackend {
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

#[async_trait]
impl Backend for BrokenBackend {
    async fn read(&self, _id: &Fingerprint) -> BackendResult<Option<Value>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::UnexpectedStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "store down".to_owned(),
        })
    }

    async fn write(&self, _id: &Fingerprint, _value: &StoredValue) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::ConnectionError("connection reset".into()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}
