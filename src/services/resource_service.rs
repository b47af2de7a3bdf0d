//! Resource service for Kubernetes operations
//!
//! Abstracts client wiring away from the CLI layer: owns the transport,
//! resolver and walker, and exposes graph resolution and raw fetches.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::graph::models::ResourceGraph;
use crate::graph::walker::{GraphWalker, ResolveOptions, TraversalProfile};
use crate::resolve::plural::PluralRules;
use crate::resolve::reference::ObjectReference;
use crate::resolve::resolver::ReferenceResolver;
use crate::resolve::transport::{KubeTransport, ObjectTransport};

/// Service for resolving resource graphs
pub struct ResourceService {
    resolver: Arc<ReferenceResolver>,
}

impl ResourceService {
    pub fn new(client: kube::Client) -> Self {
        let transport: Arc<dyn ObjectTransport> = Arc::new(KubeTransport::new(client));
        Self::with_transport(transport)
    }

    /// Build the service over any transport (used by tests)
    pub fn with_transport(transport: Arc<dyn ObjectTransport>) -> Self {
        let resolver = Arc::new(ReferenceResolver::new(transport, PluralRules::new()));
        Self { resolver }
    }

    /// Resolve the dependency graph below a root reference
    pub async fn resolve_graph(
        &self,
        root: &ObjectReference,
        profile: Option<TraversalProfile>,
        options: ResolveOptions,
    ) -> Result<ResourceGraph> {
        let walker = GraphWalker::new(Arc::clone(&self.resolver), options);
        walker
            .walk(root, profile)
            .await
            .with_context(|| format!("Failed to resolve graph for {}/{}", root.kind, root.name))
    }

    /// Fetch a single object without walking its references
    pub async fn fetch_raw(&self, reference: &ObjectReference) -> Result<serde_json::Value> {
        self.resolver
            .resolve(reference, None)
            .await
            .with_context(|| format!("Failed to fetch {}/{}", reference.kind, reference.name))
    }
}
