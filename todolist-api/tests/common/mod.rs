//! Common test utilities for integration tests
//!
//! Builds the real router on top of the in-memory store, so the full HTTP
//! stack (auth layer, error mapping, JSON shapes) runs without a database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use todolist_api::{
    app::{build_router, AppState},
    config::Config,
};
use todolist_shared::store::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the router and its store
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

/// Status plus parsed JSON body (`Value::Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://unused/test".to_string()),
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            _ => None,
        })
        .unwrap();

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config).unwrap();

        Self {
            app: build_router(state),
            store,
        }
    }

    /// Sends a request; `token` becomes a bearer header, `body` a JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse { status, body }
    }

    /// Registers an account and returns its access token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "register failed: {}", response.body);
        response.body["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a task and returns its JSON representation
    pub async fn create_task(&self, token: &str, title: &str) -> Value {
        let response = self
            .send(
                Method::POST,
                "/tasks",
                Some(token),
                Some(serde_json::json!({ "title": title })),
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "create failed: {}", response.body);
        response.body
    }
}
