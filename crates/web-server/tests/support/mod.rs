//! Shared fixtures for the router tests: an app over an in-memory database and
//! a temporary image root, plus a small multipart body builder.

use attachments::AttachmentStore;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use core_types::Driver;
use database::DbRepository;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use web_server::{AppState, build_router};

pub const HOST: &str = "localhost:5000";
const BOUNDARY: &str = "racing-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub repo: DbRepository,
    pub attachments: AttachmentStore,
    _storage: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = database::connect_in_memory().await.unwrap();
        let repo = DbRepository::new(pool);
        let storage = TempDir::new().unwrap();
        let attachments = AttachmentStore::open(storage.path()).await.unwrap();
        let state = Arc::new(AppState {
            db_repo: repo.clone(),
            attachments: AttachmentStore::open(storage.path()).await.unwrap(),
            default_scheme: "http".to_string(),
            body_limit_bytes: 1024 * 1024,
        });
        Self {
            router: build_router(state),
            repo,
            attachments,
            _storage: storage,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(&bytes)));
        (status, body)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request("GET", uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request("DELETE", uri).body(Body::empty()).unwrap()).await
    }

    pub async fn form(&self, method: &str, uri: &str, form: Multipart) -> (StatusCode, Value) {
        self.send(form.into_request(method, uri)).await
    }

    pub async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = request(method, uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Adds a driver through the API and returns the stored row.
    pub async fn add_driver(&self, name: &str) -> Driver {
        let (status, body) = self
            .form("POST", "/api/Driver/Add", Multipart::new().text("Name", name))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        self.driver_named(name).await
    }

    pub async fn driver_named(&self, name: &str) -> Driver {
        self.repo
            .list_drivers(None)
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("driver {name} not stored"))
    }
}

pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, HOST)
}

/// A hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: &str, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        request(method, uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
