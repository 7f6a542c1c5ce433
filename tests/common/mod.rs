//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the router directly with `oneshot` requests, using a fixed
//! configuration so results do not depend on the host environment.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use savings_history::config::Config;
use savings_history::handlers;
use savings_history::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// Client with the default configuration (Pacific/Auckland, 3 months, returns mode).
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    pub fn router(&self) -> Router {
        handlers::routes().with_state(self.state.clone())
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// POST a JSON body and return status and body.
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post_json_value(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let (status, text) = self.post_json(uri, body).await;
        let parsed = serde_json::from_str(&text).unwrap_or(Value::Null);
        (status, parsed)
    }

    /// POST a CSV body and parse the JSON response.
    pub async fn post_csv(&self, uri: &str, csv: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "text/csv")
            .body(Body::from(csv.to_string()))
            .unwrap();
        let (status, text) = self.send(request).await;
        let parsed = serde_json::from_str(&text).unwrap_or(Value::Null);
        (status, parsed)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
