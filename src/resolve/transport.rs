//! Object fetch transport
//!
//! The resolver talks to the API server through this trait so the traversal
//! logic can be exercised against an in-memory double in tests. The real
//! implementation issues raw GET requests through `kube::Client::request`,
//! which keeps full control over the path (the resolver constructs paths
//! itself because resource location depends on group/version/scope).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ResolveError;

/// Fetches raw objects by REST path
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    /// GET the object (or list) at `path`, returning its JSON document
    async fn get(&self, path: &str) -> Result<Value, ResolveError>;
}

/// Transport backed by a kube client. Authentication comes from the client's
/// own configuration (kubeconfig or in-cluster); the resolver never manages
/// credentials itself.
#[derive(Clone)]
pub struct KubeTransport {
    client: kube::Client,
}

impl KubeTransport {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectTransport for KubeTransport {
    async fn get(&self, path: &str) -> Result<Value, ResolveError> {
        let request = http::Request::builder()
            .method(http::Method::GET)
            .uri(path)
            .body(Vec::new())
            .map_err(|e| ResolveError::InvalidReference(format!("bad request path: {}", e)))?;

        tracing::debug!("GET {}", path);
        let value: Value = self.client.request(request).await?;
        Ok(value)
    }
}
