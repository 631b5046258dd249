//! Test helpers for tuvi-service integration tests.
//!
//! Builds the real router around a `MockTextProvider` with temporary upload
//! and static directories.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tuvi_service::config::TuviConfig;
use tuvi_service::services::providers::mock::MockTextProvider;
use tuvi_service::services::providers::TextProvider;
use tuvi_service::services::UploadStaging;
use tuvi_service::startup::build_router;
use tuvi_service::AppState;

pub const BOUNDARY: &str = "----tuvi-test-boundary";
pub const INDEX_HTML: &str = "<h1>Lá số tử vi</h1>";

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockTextProvider>,
    pub upload_dir: PathBuf,
    /// Same token the server cancels on Ctrl+C / SIGTERM.
    pub shutdown: CancellationToken,
    _dir: TempDir,
}

/// Configuration pointing at `root`, as if loaded from the environment.
pub fn test_config(root: &Path, extra: &[(&str, &str)]) -> TuviConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("GEMINI_API_KEY".into(), "test-api-key".into());
    vars.insert(
        "UPLOAD_DIR".into(),
        root.join("uploads").to_string_lossy().into_owned(),
    );
    vars.insert(
        "STATIC_DIR".into(),
        root.join("public").to_string_lossy().into_owned(),
    );
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }

    let common = CoreConfig {
        port: 0,
        ..CoreConfig::default()
    };
    TuviConfig::from_lookup(common, |key| vars.get(key).cloned())
        .expect("Failed to build test config")
}

/// Development configuration with `GEMINI_API_KEY` left unset.
pub fn config_without_api_key(root: &Path) -> TuviConfig {
    let upload_dir = root.join("uploads").to_string_lossy().into_owned();
    let static_dir = root.join("public").to_string_lossy().into_owned();
    let common = CoreConfig {
        port: 0,
        ..CoreConfig::default()
    };
    TuviConfig::from_lookup(common, |key| match key {
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        "STATIC_DIR" => Some(static_dir.clone()),
        _ => None,
    })
    .expect("Failed to build test config")
}

pub async fn spawn_test_app(provider: MockTextProvider) -> TestApp {
    spawn_test_app_with(provider, &[]).await
}

pub async fn spawn_test_app_with(provider: MockTextProvider, extra: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(dir.path(), extra);

    std::fs::create_dir_all(&config.storage.static_dir).expect("Failed to create static dir");
    std::fs::write(config.storage.static_dir.join("index.html"), INDEX_HTML)
        .expect("Failed to write index.html");

    let staging = UploadStaging::new(&config.storage.upload_dir)
        .await
        .expect("Failed to create upload staging");
    let upload_dir = config.storage.upload_dir.clone();

    let provider = Arc::new(provider);
    let text_provider: Arc<dyn TextProvider> = provider.clone();
    let state = AppState::new(config, text_provider, staging);
    let shutdown = state.shutdown.clone();

    TestApp {
        router: build_router(state),
        shutdown,
        provider,
        upload_dir,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post_multipart(&self, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/submit")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    /// Number of files currently staged.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .expect("Failed to read upload dir")
            .count()
    }
}

/// A file part of a multipart body.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> FilePart<'a> {
    pub fn png(bytes: &'a [u8]) -> Self {
        Self {
            field: "tuviImage",
            file_name: "la-so.png",
            content_type: Some("image/png"),
            bytes,
        }
    }
}

/// Encode text fields and file parts as `multipart/form-data` with [`BOUNDARY`].
pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for file in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                file.field, file.file_name
            )
            .as_bytes(),
        );
        if let Some(content_type) = file.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn user_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Nguyễn Văn An"),
        ("birthDate", "2024-02-10"),
        ("birthTime", "07:15"),
    ]
}

/// `/oracle` URI with properly encoded query parameters.
pub fn oracle_uri(params: &[(&str, &str)]) -> String {
    let url = reqwest::Url::parse_with_params("http://localhost/oracle", params)
        .expect("Failed to build oracle URL");
    format!("/oracle?{}", url.query().unwrap_or_default())
}

pub const USER_INFO_JSON: &str =
    r#"{"name":"Nguyễn Văn An","birthDate":"1990-05-15","birthTime":"08:30"}"#;
