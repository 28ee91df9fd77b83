//! In-memory transports for driving pollers deterministically

use dashboard::fetch::FetchQuery;
use dashboard::{FetchError, ResourceKind, Transport};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn kind_of(endpoint: &str) -> ResourceKind {
    endpoint
        .trim_start_matches("/api/")
        .parse()
        .expect("endpoint names a resource")
}

/// Answers from the standard fixtures and counts calls
#[derive(Default)]
pub struct CountingTransport {
    calls: AtomicUsize,
}

impl CountingTransport {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for CountingTransport {
    fn get_json<'a>(
        &'a self,
        endpoint: &'a str,
        _query: &'a FetchQuery,
    ) -> BoxFuture<'a, Result<Value, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = super::collection_json(kind_of(endpoint));
        Box::pin(async move { Ok(body) })
    }
}

/// Responses per resource that tests can swap between ticks.
/// Resources without a scripted response fail with a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<ResourceKind, Result<Value, FetchError>>>,
}

impl ScriptedTransport {
    pub fn respond(&self, kind: ResourceKind, body: Value) {
        self.responses.lock().unwrap().insert(kind, Ok(body));
    }

    pub fn fail(&self, kind: ResourceKind, status: u16) {
        self.responses.lock().unwrap().insert(
            kind,
            Err(FetchError::Protocol {
                endpoint: kind.endpoint(),
                status: Some(status),
                reason: "scripted failure".to_string(),
            }),
        );
    }
}

impl Transport for ScriptedTransport {
    fn get_json<'a>(
        &'a self,
        endpoint: &'a str,
        _query: &'a FetchQuery,
    ) -> BoxFuture<'a, Result<Value, FetchError>> {
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&kind_of(endpoint))
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Transport {
                    endpoint: endpoint.to_string(),
                    reason: "connection refused".to_string(),
                })
            });
        Box::pin(async move { response })
    }
}

/// Holds every request until `release` is called, so a tick can be kept
/// in flight while the test acts on the poller
pub struct GatedTransport {
    pub entered: Arc<Notify>,
    gate: Arc<Notify>,
    released: std::sync::atomic::AtomicBool,
}

impl GatedTransport {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
            released: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Let all pending and future requests through
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.gate.notify_waiters();
    }
}

impl Default for GatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for GatedTransport {
    fn get_json<'a>(
        &'a self,
        endpoint: &'a str,
        _query: &'a FetchQuery,
    ) -> BoxFuture<'a, Result<Value, FetchError>> {
        let body = super::collection_json(kind_of(endpoint));
        Box::pin(async move {
            let opened = self.gate.notified();
            tokio::pin!(opened);
            opened.as_mut().enable();
            self.entered.notify_one();
            if !self.released.load(Ordering::SeqCst) {
                opened.await;
            }
            Ok(body)
        })
    }
}
