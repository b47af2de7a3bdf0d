//! Reference resolver with scope-ambiguity fallback
//!
//! Callers frequently do not know whether a referenced object is
//! namespace-scoped or cluster-scoped. When a namespace is available from
//! context, the namespaced path is attempted first; a 404 (and only a 404)
//! triggers a retry at the cluster-scoped path before giving up.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ResolveError;
use crate::resolve::plural::PluralRules;
use crate::resolve::reference::{ObjectReference, PathScope};
use crate::resolve::transport::ObjectTransport;

/// Resolves object references into raw fetched documents
pub struct ReferenceResolver {
    transport: Arc<dyn ObjectTransport>,
    rules: PluralRules,
}

impl ReferenceResolver {
    pub fn new(transport: Arc<dyn ObjectTransport>, rules: PluralRules) -> Self {
        Self { transport, rules }
    }

    pub fn rules(&self) -> &PluralRules {
        &self.rules
    }

    /// Fetch the object a reference points at.
    ///
    /// `ambient_namespace` is the parent's namespace, used when the
    /// reference carries none. Kinds starting or ending with "Composite"
    /// are always resolved cluster-scoped.
    pub async fn resolve(
        &self,
        reference: &ObjectReference,
        ambient_namespace: Option<&str>,
    ) -> Result<Value, ResolveError> {
        if reference.is_always_cluster_scoped() {
            let path = reference.rest_path(&self.rules, PathScope::Cluster, None)?;
            return self.transport.get(&path).await;
        }

        let has_namespace = reference.namespace.is_some() || ambient_namespace.is_some();
        if !has_namespace {
            let path = reference.rest_path(&self.rules, PathScope::Cluster, None)?;
            return self.transport.get(&path).await;
        }

        let namespaced_path =
            reference.rest_path(&self.rules, PathScope::Namespaced, ambient_namespace)?;
        match self.transport.get(&namespaced_path).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_not_found() => {
                // Scope fallback: retry cluster-scoped before giving up
                tracing::debug!(
                    "{} not found at {}, retrying cluster-scoped",
                    reference.kind,
                    namespaced_path
                );
                let cluster_path = reference.rest_path(&self.rules, PathScope::Cluster, None)?;
                self.transport.get(&cluster_path).await
            }
            Err(err) => Err(err),
        }
    }

    /// List objects of the reference's type, filtered by a label selector,
    /// returning the items array. The list is issued at the reference's own
    /// scope (namespaced when a namespace is available).
    pub async fn list(
        &self,
        reference: &ObjectReference,
        ambient_namespace: Option<&str>,
        label_selector: &str,
    ) -> Result<Vec<Value>, ResolveError> {
        let scope = if reference.namespace.is_some() || ambient_namespace.is_some() {
            PathScope::Namespaced
        } else {
            PathScope::Cluster
        };
        let path = reference.list_path(
            &self.rules,
            scope,
            ambient_namespace,
            Some(label_selector),
        )?;
        let value = self.transport.get(&path).await?;
        let items = value
            .get("items")
            .and_then(|i| i.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(items)
    }
}
