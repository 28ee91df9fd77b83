use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::transport::{FetchQuery, Transport};
use crate::errors::FetchError;
use crate::records::{ResourceBatch, ResourceKind};

/// Result of one fetch. `batch` is always present; it is empty when
/// `error` is set.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub kind: ResourceKind,
    pub batch: ResourceBatch,
    pub error: Option<FetchError>,
    pub elapsed: Duration,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch one resource collection. Never fails: errors are logged and
    /// returned alongside an empty batch.
    pub async fn fetch(&self, kind: ResourceKind, query: &FetchQuery) -> FetchOutcome {
        let endpoint = kind.endpoint();
        let started = Instant::now();

        let result = match self.transport.get_json(&endpoint, query).await {
            Ok(body) => decode_body(kind, &endpoint, body),
            Err(e) => Err(e),
        };
        let elapsed = started.elapsed();

        match result {
            Ok(mut batch) => {
                let duplicates = batch.dedupe_by_id();
                if duplicates > 0 {
                    warn!(
                        "Dropped {} duplicate {} records from {}",
                        duplicates, kind, endpoint
                    );
                }
                debug!(
                    "Fetched {} {} records in {}ms",
                    batch.len(),
                    kind,
                    elapsed.as_millis()
                );
                FetchOutcome {
                    kind,
                    batch,
                    error: None,
                    elapsed,
                }
            }
            Err(error) => {
                warn!("Fetch of {} failed: {}", kind, error);
                FetchOutcome {
                    kind,
                    batch: ResourceBatch::empty(kind),
                    error: Some(error),
                    elapsed,
                }
            }
        }
    }
}

/// Accepts a bare array or a `{ success, data }` envelope
pub fn decode_body(
    kind: ResourceKind,
    endpoint: &str,
    body: Value,
) -> Result<ResourceBatch, FetchError> {
    let items = match body {
        Value::Array(_) => body,
        Value::Object(mut envelope) => {
            let success = envelope.get("success").and_then(Value::as_bool);
            if success == Some(false) {
                let reason = envelope
                    .get("error")
                    .or_else(|| envelope.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string();
                return Err(FetchError::Protocol {
                    endpoint: endpoint.to_string(),
                    status: None,
                    reason,
                });
            }

            match envelope.remove("data") {
                Some(data @ Value::Array(_)) => data,
                Some(Value::Null) | None if success == Some(true) => Value::Array(Vec::new()),
                Some(other) => {
                    return Err(FetchError::Decode {
                        endpoint: endpoint.to_string(),
                        reason: format!("expected array in 'data', got {}", json_type(&other)),
                    })
                }
                None => {
                    return Err(FetchError::Decode {
                        endpoint: endpoint.to_string(),
                        reason: "object body without 'data' array".to_string(),
                    })
                }
            }
        }
        other => {
            return Err(FetchError::Decode {
                endpoint: endpoint.to_string(),
                reason: format!("expected array or envelope, got {}", json_type(&other)),
            })
        }
    };

    ResourceBatch::decode(kind, items).map_err(|e| FetchError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use serde_json::json;

    struct StaticTransport(Result<Value, FetchError>);

    impl Transport for StaticTransport {
        fn get_json<'a>(
            &'a self,
            _endpoint: &'a str,
            _query: &'a FetchQuery,
        ) -> BoxFuture<'a, Result<Value, FetchError>> {
            let response = self.0.clone();
            Box::pin(async move { response })
        }
    }

    fn fetcher(response: Result<Value, FetchError>) -> Fetcher {
        Fetcher::new(Arc::new(StaticTransport(response)))
    }

    #[tokio::test]
    async fn envelope_body_is_unwrapped() {
        let outcome = fetcher(Ok(json!({
            "success": true,
            "data": [{"id": "s1", "status": "active", "tokens24h": 10}]
        })))
        .fetch(ResourceKind::Sessions, &FetchQuery::default())
        .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.batch.len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_empty() {
        let outcome = fetcher(Err(FetchError::Transport {
            endpoint: "/api/runs".to_string(),
            reason: "connection refused".to_string(),
        }))
        .fetch(ResourceKind::Runs, &FetchQuery::default())
        .await;

        assert!(outcome.batch.is_empty());
        assert_eq!(outcome.batch.kind(), ResourceKind::Runs);
        assert!(matches!(outcome.error, Some(FetchError::Transport { .. })));
    }

    #[test]
    fn failed_envelope_is_protocol_error() {
        let err = decode_body(
            ResourceKind::Logs,
            "/api/logs",
            json!({"success": false, "error": "store offline"}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FetchError::Protocol {
                endpoint: "/api/logs".to_string(),
                status: None,
                reason: "store offline".to_string(),
            }
        );
    }

    #[test]
    fn success_envelope_without_data_is_empty() {
        let batch = decode_body(ResourceKind::Skills, "/api/skills", json!({"success": true}))
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn scalar_body_is_decode_error() {
        let err = decode_body(ResourceKind::Agents, "/api/agents", json!("nope")).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
