//! Shared test transport
//!
//! An in-memory `ObjectTransport` keyed by REST path, with a call log so
//! tests can assert fallback order.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crossgraph::error::ResolveError;
use crossgraph::resolve::transport::ObjectTransport;

#[derive(Default)]
pub struct FakeTransport {
    objects: HashMap<String, Value>,
    failures: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` at `path`
    pub fn with_object(mut self, path: &str, value: Value) -> Self {
        self.objects.insert(path.to_string(), value);
        self
    }

    /// Fail requests to `path` with the given HTTP status
    pub fn with_failure(mut self, path: &str, status: u16) -> Self {
        self.failures.insert(path.to_string(), status);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectTransport for FakeTransport {
    async fn get(&self, path: &str) -> Result<Value, ResolveError> {
        self.calls.lock().unwrap().push(path.to_string());
        if let Some(&status) = self.failures.get(path) {
            if status == 404 {
                return Err(ResolveError::NotFound);
            }
            return Err(ResolveError::Upstream {
                status,
                body: "simulated failure".to_string(),
            });
        }
        self.objects
            .get(path)
            .cloned()
            .ok_or(ResolveError::NotFound)
    }
}
