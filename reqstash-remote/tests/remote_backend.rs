//! Integration tests for RemoteBackend using wiremock.

use reqstash_backend::{Backend, BackendError};
use reqstash_core::{Fingerprint, RequestDescriptor, StoredValue};
use reqstash_remote::RemoteBackend;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn id() -> Fingerprint {
    Fingerprint::of(&RequestDescriptor::get("http://upstream/").url("items"))
}

fn backend(server: &MockServer) -> RemoteBackend {
    RemoteBackend::new(format!("{}/cache", server.uri())).unwrap()
}

#[tokio::test]
async fn test_read_hit_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/cache/{}", id())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": 3, "foo": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let value = backend(&server).read(&id()).await.unwrap();
    assert_eq!(value, Some(json!({"_id": 3, "foo": 1})));
}

#[tokio::test]
async fn test_read_404_is_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(backend(&server).read(&id()).await.unwrap(), None);
}

#[tokio::test]
async fn test_read_other_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let err = backend(&server).read(&id()).await.unwrap_err();
    match err {
        BackendError::UnexpectedStatus { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_read_invalid_json_is_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = backend(&server).read(&id()).await.unwrap_err();
    assert!(matches!(err, BackendError::FormatError(_)));
}

#[tokio::test]
async fn test_read_unreachable_store_is_connection_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let backend = RemoteBackend::new(format!("http://127.0.0.1:{port}/cache")).unwrap();

    let err = backend.read(&id()).await.unwrap_err();
    assert!(matches!(err, BackendError::ConnectionError(_)));
}

#[tokio::test]
async fn test_write_posts_json_to_fingerprint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/cache/{}", id())))
        .and(body_json(json!({"foo": 1})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let value = StoredValue::from_store(json!({"foo": 1}));
    backend(&server).write(&id(), &value).await.unwrap();
}

#[tokio::test]
async fn test_write_rejected_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let value = StoredValue::from_store(json!({"foo": 1}));
    let err = backend(&server).write(&id(), &value).await.unwrap_err();
    assert!(matches!(err, BackendError::UnexpectedStatus { .. }));
}
