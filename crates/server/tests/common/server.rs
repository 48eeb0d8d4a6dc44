//! Server test utilities.

use super::fixtures::MultipartBuilder;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use leadline_core::config::AppConfig;
use leadline_metadata::{MetadataStore, SqliteStore};
use leadline_server::{AppState, create_router};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage and SQLite.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(temp_dir.path().join("leads.db"))
                .await
                .expect("Failed to create metadata store"),
        );
        Self::build(temp_dir, metadata, modifier).await
    }

    /// Create a test server over an existing metadata store.
    pub async fn with_metadata(metadata: Arc<dyn MetadataStore>) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self::build(temp_dir, metadata, |_| {}).await
    }

    async fn build<F>(temp_dir: TempDir, metadata: Arc<dyn MetadataStore>, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = AppConfig::for_testing(temp_dir.path());
        modifier(&mut config);

        let files = leadline_storage::file_store_from_config(&config.storage)
            .await
            .expect("Failed to create file store");
        let state = AppState::new(config, metadata, files);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Issue a request and return the status with the parsed JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Helper to make JSON requests.
    pub async fn json_request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    /// Helper to make multipart requests.
    pub async fn multipart_request(
        &self,
        method: &str,
        uri: &str,
        form: MultipartBuilder,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, MultipartBuilder::content_type())
            .body(Body::from(form.build()))
            .unwrap();

        self.send(request).await
    }

    /// Fetch raw bytes, e.g. a served attachment.
    pub async fn get_bytes(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    /// Create a lead through the API and return its id.
    pub async fn create_lead(&self, body: Value) -> i64 {
        let (status, json) = self.json_request("POST", "/api/contacts", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
        json["data"]["id"].as_i64().expect("created lead has an id")
    }
}
