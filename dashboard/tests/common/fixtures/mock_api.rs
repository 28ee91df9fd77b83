//! Mock telemetry source for testing
//!
//! Serves the collection endpoints without a running telemetry-source
//! binary.

use dashboard::ResourceKind;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub struct MockTelemetryServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockTelemetryServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Serve `data` wrapped in the success envelope
    pub async fn mock_collection(&self, kind: ResourceKind, data: Value) {
        Mock::given(method("GET"))
            .and(path(kind.endpoint()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": data
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve `data` as a bare JSON array
    pub async fn mock_bare_collection(&self, kind: ResourceKind, data: Value) {
        Mock::given(method("GET"))
            .and(path(kind.endpoint()))
            .respond_with(ResponseTemplate::new(200).set_body_json(data))
            .mount(&self.server)
            .await;
    }

    /// Only answer when the expected `limit` is forwarded
    pub async fn mock_collection_with_limit(&self, kind: ResourceKind, limit: u32, data: Value) {
        Mock::given(method("GET"))
            .and(path(kind.endpoint()))
            .and(query_param("limit", limit.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": data
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, kind: ResourceKind, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(kind.endpoint()))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Serve a raw body that may not be valid JSON
    pub async fn mock_raw_body(&self, kind: ResourceKind, body: &str) {
        Mock::given(method("GET"))
            .and(path(kind.endpoint()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_failed_envelope(&self, kind: ResourceKind, error: &str) {
        Mock::given(method("GET"))
            .and(path(kind.endpoint()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": error
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_slow_collection(&self, kind: ResourceKind, data: Value, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(kind.endpoint()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": data}))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve every resource from the standard fixtures
    pub async fn mock_all_collections(&self) {
        self.mock_collection(ResourceKind::Agents, super::agents_json()).await;
        self.mock_collection(ResourceKind::Sessions, super::sessions_json()).await;
        self.mock_collection(ResourceKind::Runs, super::runs_json()).await;
        self.mock_collection(ResourceKind::Logs, super::logs_json()).await;
        self.mock_collection(ResourceKind::Skills, super::skills_json()).await;
        self.mock_collection(ResourceKind::Health, super::health_json()).await;
    }
}
