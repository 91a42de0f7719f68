//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with a mock toolkit injected, so every endpoint can be exercised without
//! ffmpeg installed.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mediaforge_core::{testing::MockToolkit, Config, MediaToolkit};
use mediaforge_server::api::{create_router, WsBroadcaster, WsMessage};
use mediaforge_server::state::AppState;

/// Re-export fixtures for test convenience
pub use mediaforge_core::testing::fixtures;

/// Test fixture with a mock toolkit.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock toolkit - inject errors, durations, inspect calls
    pub toolkit: Arc<MockToolkit>,
    /// Broadcaster shared with the router, for observing status messages
    pub broadcaster: WsBroadcaster,
    /// Temporary directory used as the tools temp dir
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.tools.temp_dir = temp_dir.path().join("scratch");

        let toolkit = Arc::new(MockToolkit::new());
        let broadcaster = WsBroadcaster::new(64);

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&toolkit) as Arc<dyn MediaToolkit>,
            broadcaster.clone(),
        ));

        Self {
            router: create_router(state),
            toolkit,
            broadcaster,
            temp_dir,
        }
    }

    /// Write a concat list into the fixture directory.
    pub fn write_list(&self, name: &str, text: &str) -> std::path::PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, text).expect("Failed to write concat list");
        path
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Poll a compression job until it leaves the running state.
    pub async fn wait_for_job(&self, job_id: &str) -> TestResponse {
        for _ in 0..100 {
            let response = self.get(&format!("/api/v1/media/jobs/{}", job_id)).await;
            if response.body["state"] != "running" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    /// Collect broadcast messages until `job_finished` arrives.
    pub async fn collect_until_finished(
        rx: &mut tokio::sync::broadcast::Receiver<WsMessage>,
    ) -> Vec<WsMessage> {
        let mut messages = Vec::new();
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("Timed out waiting for messages")
                .expect("Broadcast channel closed");
            let done = matches!(msg, WsMessage::JobFinished { .. });
            messages.push(msg);
            if done {
                return messages;
            }
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
