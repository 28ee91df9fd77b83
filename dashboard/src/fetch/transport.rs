use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::constants;
use crate::errors::FetchError;

/// Optional pagination forwarded as query parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl FetchQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// Request/response capability the fetcher runs on.
/// Implementations classify every failure into a `FetchError`.
pub trait Transport: Send + Sync {
    fn get_json<'a>(
        &'a self,
        endpoint: &'a str,
        query: &'a FetchQuery,
    ) -> BoxFuture<'a, Result<Value, FetchError>>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(constants::http::CONNECT_TIMEOUT.min(request_timeout))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn get_json<'a>(
        &'a self,
        endpoint: &'a str,
        query: &'a FetchQuery,
    ) -> BoxFuture<'a, Result<Value, FetchError>> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, endpoint);
            debug!("GET {} {:?}", url, query);

            let response = self
                .client
                .get(&url)
                .query(&query.to_pairs())
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let reason = if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                } else {
                    body.chars().take(200).collect()
                };
                return Err(FetchError::Protocol {
                    endpoint: endpoint.to_string(),
                    status: Some(status.as_u16()),
                    reason,
                });
            }

            let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
                endpoint: endpoint.to_string(),
                reason: format!("failed to read body: {}", e),
            })?;

            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
        })
    }
}
