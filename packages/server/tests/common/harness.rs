//! In-process test harness: the full router driven with `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use server_core::common::SessionId;
use server_core::kernel::test_dependencies::TestDependencies;
use server_core::kernel::ServerDeps;
use server_core::server::{build_app, Session, SessionRegistry};
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<SessionRegistry>,
}

impl TestApp {
    /// Router backed by the given mocks.
    pub fn new(test_deps: &TestDependencies) -> Self {
        Self::with_deps(test_deps.server_deps())
    }

    pub fn with_deps(server_deps: ServerDeps) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let (router, sessions) = build_app(server_deps);
        Self { router, sessions }
    }

    /// Send one request; returns the status and the JSON body (`Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.raw_request(method, uri, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn raw_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let response = self.send(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Open a session over HTTP and wait for its sign-in to settle.
    pub async fn open_session(&self) -> (String, Arc<Session>) {
        let (status, body) = self.request(Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);

        let id = body["sessionId"].as_str().unwrap().to_string();
        let session = self.session(&id).await;
        session.identity.watch().settled().await;
        (id, session)
    }

    pub async fn session(&self, id: &str) -> Arc<Session> {
        let id: SessionId = id.parse().unwrap();
        self.sessions.get(&id).await.unwrap()
    }
}
