#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use job_board_backend::{
    config::Config,
    database::memory_store::MemoryStore,
    middleware::auth::{issue_token, ROLE_ADMIN, ROLE_EMPLOYER},
    routes::build_router,
    AppState,
};
use serde_json::Value as JsonValue;
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test_secret_key";
pub const SITE_URL: &str = "https://jobs.example.org";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: "memory".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        site_url: SITE_URL.to_string(),
        site_name: "HealthCare Jobs".to_string(),
        sitemap_path: dir.path().join("public").join("sitemap.xml"),
        public_rps: 10_000,
        admin_rps: 10_000,
        sweep_enabled: false,
        sweep_retry_delay: Duration::from_millis(10),
    }
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), test_config(&dir)).expect("app state");
        Self {
            router: build_router(state.clone()),
            state,
            store,
            _dir: dir,
        }
    }

    pub fn admin_token(&self) -> String {
        issue_token(JWT_SECRET, "admin-1", ROLE_ADMIN, 3600).expect("token")
    }

    pub fn employer_token(&self) -> String {
        issue_token(JWT_SECRET, "employer-1", ROLE_EMPLOYER, 3600).expect("token")
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let (status, bytes) = self.send_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };
        (status, json)
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }

    pub async fn sitemap(&self) -> String {
        let (status, bytes) = self.send_raw(Method::GET, "/sitemap.xml", None, None).await;
        assert_eq!(status, StatusCode::OK);
        String::from_utf8(bytes).expect("utf8 sitemap")
    }

    /// Creates an approved posting through the admin API and returns its JSON.
    pub async fn admin_create(&self, body: JsonValue) -> JsonValue {
        let token = self.admin_token();
        let (status, json) = self
            .send(Method::POST, "/api/admin/jobs", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
        json
    }
}

pub fn sitemap_has(xml: &str, slug: &str) -> bool {
    xml.contains(&format!("<loc>{}/jobs/{}</loc>", SITE_URL, slug))
}
