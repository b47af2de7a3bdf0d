//! Graph walker
//!
//! Traverses from a root object along family-specific reference fields,
//! building leveled parent/child nodes and deduplicating by identity.
//! Three traversal profiles exist because each upstream system encodes its
//! dependency links differently:
//!
//! - **Claim**: claim -> composite (via `status.compositeResourceRef`, then
//!   `spec.resourceRef`) -> managed resources (via `status.resourceRefs`,
//!   then `spec.resourceRefs`).
//! - **Composite**: composite -> managed resources via
//!   `spec.crossplane.resourceRefs`, with each managed resource re-inspected
//!   for its own refs, one further level.
//! - **Instance**: a KRO instance whose sub-resource types are enumerated in
//!   an annotation; each type is listed by ownership labels and each item
//!   re-fetched individually for full detail.
//!
//! The root fetch is load-bearing and fails the whole resolution; every
//! descendant fetch is best-effort. A graph with a known-incomplete branch
//! is more useful to the caller than no graph at all.

use std::str::FromStr;
use std::sync::Arc;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::error::ResolveError;
use crate::graph::classify::{classify, ClassifyContext, TraversalPosition};
use crate::graph::models::{ResourceGraph, ResourceNode};
use crate::graph::status::{extract_conditions, normalize};
use crate::resolve::reference::ObjectReference;
use crate::resolve::resolver::ReferenceResolver;

/// KRO ownership label marking an object as owned by an instance
pub const OWNED_LABEL: &str = "kro.run/owned";
/// KRO label carrying the owning instance's id
pub const INSTANCE_ID_LABEL: &str = "kro.run/instance-id";
/// KRO label carrying the resource graph definition's id
pub const RGD_ID_LABEL: &str = "kro.run/resource-graph-definition-id";
/// Annotation enumerating an instance's sub-resource types as a
/// comma-separated `apiVersion:kind` list
pub const SUB_RESOURCES_ANNOTATION: &str = "kro.run/resources";

/// Ordered candidate accessors for the composite reference on a claim
const CLAIM_COMPOSITE_REF: &[&[&str]] = &[
    &["status", "compositeResourceRef"],
    &["spec", "resourceRef"],
];
/// Ordered candidate accessors for a v1 composite's managed resource refs
const COMPOSITE_RESOURCE_REFS: &[&[&str]] = &[
    &["status", "resourceRefs"],
    &["spec", "resourceRefs"],
];
/// Accessor for a v2 (composite-only) object's managed resource refs
const CROSSPLANE_V2_REFS: &[&[&str]] = &[&["spec", "crossplane", "resourceRefs"]];

/// Which family of reference fields to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalProfile {
    /// Claim-based composition: claim(0) -> composite(1) -> managed(2)
    Claim,
    /// Composite-only: composite(0) -> managed(1) -> nested-managed(2)
    Composite,
    /// Instance-based declarative template: instance(0) -> resource(1)
    Instance,
}

impl TraversalProfile {
    /// Pick a profile from the root's apparent shape when the caller did
    /// not name one
    pub fn infer(root: &Value) -> Self {
        if annotation(root, SUB_RESOURCES_ANNOTATION).is_some()
            || label(root, INSTANCE_ID_LABEL).is_some()
        {
            return TraversalProfile::Instance;
        }
        if first_present(root, CROSSPLANE_V2_REFS).is_some() {
            return TraversalProfile::Composite;
        }
        TraversalProfile::Claim
    }
}

impl FromStr for TraversalProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claim" => Ok(TraversalProfile::Claim),
            "composite" => Ok(TraversalProfile::Composite),
            "instance" => Ok(TraversalProfile::Instance),
            other => Err(format!("unknown traversal profile: {}", other)),
        }
    }
}

/// Per-resolution tuning
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Bounded concurrency for sibling fetches
    pub fan_out: usize,
    /// Hitting the deadline stops traversal and returns whatever nodes
    /// were already resolved
    pub deadline: Option<Instant>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            fan_out: 8,
            deadline: None,
        }
    }
}

/// Ids the active root contributes to classification of its descendants
#[derive(Debug, Clone, Default)]
struct RootIdentity {
    uid: Option<String>,
    instance_id: Option<String>,
    rgd_id: Option<String>,
}

impl RootIdentity {
    fn from_root(root: &Value) -> Self {
        let uid = root
            .get("metadata")
            .and_then(|m| m.get("uid"))
            .and_then(|u| u.as_str())
            .map(|s| s.to_string());
        Self {
            instance_id: label(root, INSTANCE_ID_LABEL)
                .map(|s| s.to_string())
                .or_else(|| uid.clone()),
            rgd_id: label(root, RGD_ID_LABEL).map(|s| s.to_string()),
            uid,
        }
    }
}

/// Walks reference chains into a `ResourceGraph`
pub struct GraphWalker {
    resolver: Arc<ReferenceResolver>,
    options: ResolveOptions,
}

impl GraphWalker {
    pub fn new(resolver: Arc<ReferenceResolver>, options: ResolveOptions) -> Self {
        Self { resolver, options }
    }

    /// Resolve the full graph below `root_ref`.
    ///
    /// A root fetch failure is fatal; descendant failures are logged and
    /// the reference is excluded from the graph.
    pub async fn walk(
        &self,
        root_ref: &ObjectReference,
        profile: Option<TraversalProfile>,
    ) -> Result<ResourceGraph, ResolveError> {
        let root_value = self.fetch_root(root_ref).await?;
        let profile = profile.unwrap_or_else(|| TraversalProfile::infer(&root_value));
        let identity = RootIdentity::from_root(&root_value);
        tracing::debug!(
            "walking {} {} with profile {:?}",
            root_ref.kind,
            root_ref.name,
            profile
        );

        let root_position = match profile {
            TraversalProfile::Claim => TraversalPosition::Claim,
            TraversalProfile::Composite => TraversalPosition::Composite,
            TraversalProfile::Instance => TraversalPosition::Unpositioned,
        };

        let mut graph = ResourceGraph::new();
        let root_node = self.build_node(&root_value, root_position, &identity, 0, None)?;
        let root_id = root_node.id.clone();
        let root_ns = root_node
            .namespace
            .clone()
            .or_else(|| root_ref.namespace.clone());
        graph.add_node(root_node);

        match profile {
            TraversalProfile::Claim => {
                self.walk_claim(&mut graph, &root_value, &root_id, root_ns, &identity)
                    .await;
            }
            TraversalProfile::Composite => {
                self.walk_composite(&mut graph, &root_value, &root_id, root_ns, &identity)
                    .await;
            }
            TraversalProfile::Instance => {
                self.walk_instance(&mut graph, &root_value, &root_id, root_ns, &identity)
                    .await;
            }
        }

        Ok(graph)
    }

    /// claim(0) -> composite(1) -> managed(2)
    async fn walk_claim(
        &self,
        graph: &mut ResourceGraph,
        root_value: &Value,
        root_id: &str,
        root_ns: Option<String>,
        identity: &RootIdentity,
    ) {
        let Some(composite_ref_value) = first_present(root_value, CLAIM_COMPOSITE_REF) else {
            tracing::debug!("claim {} carries no composite reference", root_id);
            return;
        };
        let composite_ref = match parse_reference(composite_ref_value) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("skipping invalid composite reference: {}", e);
                return;
            }
        };

        let composite_value = match self.fetch_descendant(&composite_ref, root_ns.clone()).await {
            Some(v) => v,
            None => return,
        };
        let composite_node = match self.build_node(
            &composite_value,
            TraversalPosition::Composite,
            identity,
            1,
            Some(root_id.to_string()),
        ) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("skipping malformed composite {}: {}", composite_ref.name, e);
                return;
            }
        };
        let composite_id = composite_node.id.clone();
        let composite_ns = composite_node.namespace.clone().or(root_ns);
        if !graph.add_node(composite_node) {
            // Already visited, refuse to re-descend
            return;
        }

        self.expand_resource_refs(
            graph,
            &composite_value,
            COMPOSITE_RESOURCE_REFS,
            &composite_id,
            composite_ns,
            2,
            identity,
        )
        .await;
    }

    /// composite(0) -> managed(1) -> nested-managed(2), one extra level only
    async fn walk_composite(
        &self,
        graph: &mut ResourceGraph,
        root_value: &Value,
        root_id: &str,
        root_ns: Option<String>,
        identity: &RootIdentity,
    ) {
        let added = self
            .expand_resource_refs(
                graph,
                root_value,
                CROSSPLANE_V2_REFS,
                root_id,
                root_ns,
                1,
                identity,
            )
            .await;

        for (id, value, ns) in added {
            if self.deadline_expired() {
                tracing::warn!("deadline reached, stopping nested composite walk");
                break;
            }
            self.expand_resource_refs(graph, &value, CROSSPLANE_V2_REFS, &id, ns, 2, identity)
                .await;
        }
    }

    /// instance(0) -> labeled resources(1), discovered by listing each
    /// enumerated sub-resource type
    async fn walk_instance(
        &self,
        graph: &mut ResourceGraph,
        root_value: &Value,
        root_id: &str,
        root_ns: Option<String>,
        identity: &RootIdentity,
    ) {
        let Some(type_list) = annotation(root_value, SUB_RESOURCES_ANNOTATION) else {
            tracing::debug!("instance {} carries no sub-resource annotation", root_id);
            return;
        };
        let type_list = type_list.to_string();
        let Some(instance_id) = identity.instance_id.clone() else {
            tracing::warn!("instance {} has no instance id, cannot list resources", root_id);
            return;
        };

        let mut selector = format!("{}=true,{}={}", OWNED_LABEL, INSTANCE_ID_LABEL, instance_id);
        if let Some(rgd_id) = &identity.rgd_id {
            selector.push_str(&format!(",{}={}", RGD_ID_LABEL, rgd_id));
        }

        for entry in type_list.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if self.deadline_expired() {
                tracing::warn!("deadline reached, stopping instance resource listing");
                break;
            }
            let Some((api_version, kind)) = entry.rsplit_once(':') else {
                tracing::warn!("skipping malformed sub-resource type entry: {}", entry);
                continue;
            };

            let type_ref = ObjectReference::new(api_version, kind, "", root_ns.as_deref());
            let items = match self
                .resolver
                .list(&type_ref, root_ns.as_deref(), &selector)
                .await
            {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("failed to list {} for instance {}: {}", kind, root_id, e);
                    continue;
                }
            };

            // List items can omit apiVersion/kind; re-fetch each one
            // individually for full detail
            let refs: Vec<ObjectReference> = items
                .iter()
                .filter_map(|item| {
                    let metadata = item.get("metadata")?;
                    let name = metadata.get("name").and_then(|n| n.as_str())?;
                    let namespace = metadata.get("namespace").and_then(|n| n.as_str());
                    Some(ObjectReference::new(api_version, kind, name, namespace))
                })
                .collect();

            let fetched = self.fetch_children(refs, root_ns.clone()).await;
            for (reference, result) in fetched {
                let value = match result {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(
                            "failed to fetch {}/{}: {}",
                            reference.kind,
                            reference.name,
                            e
                        );
                        continue;
                    }
                };
                let node = match self.build_node(
                    &value,
                    TraversalPosition::Unpositioned,
                    identity,
                    1,
                    Some(root_id.to_string()),
                ) {
                    Ok(n) => n,
                    Err(e) => {
                        tracing::warn!("skipping malformed {}: {}", reference.name, e);
                        continue;
                    }
                };
                let added = graph.add_node(node.clone());
                if added {
                    self.maybe_synthesize_manifest(graph, &node);
                }
            }
        }
    }

    /// Resolve a sibling group of resource refs found on `parent_value`,
    /// appending managed-resource nodes at `level`. Returns the nodes that
    /// were actually added (id, raw document, namespace) so callers can
    /// recurse.
    async fn expand_resource_refs(
        &self,
        graph: &mut ResourceGraph,
        parent_value: &Value,
        candidates: &[&[&str]],
        parent_id: &str,
        parent_ns: Option<String>,
        level: u32,
        identity: &RootIdentity,
    ) -> Vec<(String, Value, Option<String>)> {
        let Some(refs_value) = first_present(parent_value, candidates) else {
            return Vec::new();
        };
        let Some(entries) = refs_value.as_array() else {
            tracing::warn!("resource refs on {} are not an array", parent_id);
            return Vec::new();
        };

        let mut refs = Vec::new();
        for entry in entries {
            match parse_reference(entry) {
                Ok(r) => refs.push(r),
                Err(e) => tracing::warn!("skipping invalid resource reference: {}", e),
            }
        }

        let fetched = self.fetch_children(refs, parent_ns.clone()).await;
        let mut added = Vec::new();
        for (reference, result) in fetched {
            let value = match result {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(
                        "failed to fetch {}/{}: {}",
                        reference.kind,
                        reference.name,
                        e
                    );
                    continue;
                }
            };
            let node = match self.build_node(
                &value,
                TraversalPosition::Managed,
                identity,
                level,
                Some(parent_id.to_string()),
            ) {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!("skipping malformed {}: {}", reference.name, e);
                    continue;
                }
            };
            let id = node.id.clone();
            let ns = node.namespace.clone().or_else(|| parent_ns.clone());
            if graph.add_node(node.clone()) {
                self.maybe_synthesize_manifest(graph, &node);
                added.push((id, value, ns));
            }
        }
        added
    }

    /// A managed resource of kind `Object` is a passthrough wrapper whose
    /// remote manifest lives in `status.atProvider.manifest`. Synthesize a
    /// node for the manifest's own object; it is never independently
    /// fetched.
    fn maybe_synthesize_manifest(&self, graph: &mut ResourceGraph, wrapper: &ResourceNode) {
        if wrapper.kind != "Object" {
            return;
        }
        let Some(manifest) = wrapper
            .raw
            .get("status")
            .and_then(|s| s.get("atProvider"))
            .and_then(|p| p.get("manifest"))
            .filter(|m| m.is_object())
        else {
            return;
        };

        let kind = manifest.get("kind").and_then(|k| k.as_str());
        let name = manifest
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str());
        let (Some(kind), Some(name)) = (kind, name) else {
            tracing::warn!(
                "Object {} carries a manifest without kind/name, skipping",
                wrapper.name
            );
            return;
        };

        // Point the manifest back at its wrapper so consumers see the
        // ownership edge in the raw document too
        let mut raw = manifest.clone();
        let owner_ref = json!([{
            "apiVersion": wrapper.raw.get("apiVersion").cloned().unwrap_or(Value::Null),
            "kind": wrapper.kind,
            "name": wrapper.name,
            "uid": wrapper.raw.get("metadata").and_then(|m| m.get("uid")).cloned().unwrap_or(Value::Null),
        }]);
        if let Some(metadata) = raw.get_mut("metadata").and_then(|m| m.as_object_mut()) {
            metadata.insert("ownerReferences".to_string(), owner_ref);
        }

        let namespace = raw
            .get("metadata")
            .and_then(|m| m.get("namespace"))
            .and_then(|n| n.as_str())
            .map(|s| s.to_string())
            .or_else(|| wrapper.namespace.clone());
        let uid = raw
            .get("metadata")
            .and_then(|m| m.get("uid"))
            .and_then(|u| u.as_str())
            .map(|s| s.to_string());
        let id = uid.unwrap_or_else(|| format!("{}-{}", kind, name));
        let group = raw
            .get("apiVersion")
            .and_then(|a| a.as_str())
            .and_then(|a| a.split_once('/'))
            .map(|(g, _)| g.to_string())
            .unwrap_or_default();

        let node = ResourceNode {
            id,
            node_type: classify(kind, ClassifyContext::default()),
            kind: kind.to_string(),
            group,
            name: name.to_string(),
            namespace,
            status: normalize(extract_conditions(&raw)),
            created_at: None,
            raw,
            level: wrapper.level + 1,
            parent_id: Some(wrapper.id.clone()),
        };
        graph.add_node(node);
    }

    /// Build a node from a raw document. Fails on missing kind/name, which
    /// callers treat as a descendant failure (or a fatal one for the root).
    fn build_node(
        &self,
        obj: &Value,
        position: TraversalPosition,
        identity: &RootIdentity,
        level: u32,
        parent_id: Option<String>,
    ) -> Result<ResourceNode, ResolveError> {
        let kind = obj
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or_else(|| ResolveError::InvalidReference("object missing kind".to_string()))?;
        let metadata = obj
            .get("metadata")
            .ok_or_else(|| ResolveError::InvalidReference("object missing metadata".to_string()))?;
        let name = metadata
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| ResolveError::InvalidReference("object missing name".to_string()))?;

        let namespace = metadata
            .get("namespace")
            .and_then(|n| n.as_str())
            .map(|s| s.to_string());
        let uid = metadata.get("uid").and_then(|u| u.as_str());
        // Fallback key can collide across namespaces/clusters; kept as the
        // upstream APIs behave
        let id = uid
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("{}-{}", kind, name));

        let group = obj
            .get("apiVersion")
            .and_then(|a| a.as_str())
            .and_then(|a| a.split_once('/'))
            .map(|(g, _)| g.to_string())
            .unwrap_or_default();

        let created_at = metadata
            .get("creationTimestamp")
            .and_then(|t| t.as_str())
            .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&chrono::Utc));

        let ctx = classify_context(obj, identity, position);

        Ok(ResourceNode {
            id,
            node_type: classify(kind, ctx),
            kind: kind.to_string(),
            group,
            name: name.to_string(),
            namespace,
            status: normalize(extract_conditions(obj)),
            created_at,
            raw: obj.clone(),
            level,
            parent_id,
        })
    }

    async fn fetch_root(&self, root_ref: &ObjectReference) -> Result<Value, ResolveError> {
        match self.options.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ResolveError::Upstream {
                status: 0,
                body: "deadline exceeded fetching root".to_string(),
            }),
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.resolver.resolve(root_ref, None))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ResolveError::Upstream {
                        status: 0,
                        body: "deadline exceeded fetching root".to_string(),
                    }),
                }
            }
            None => self.resolver.resolve(root_ref, None).await,
        }
    }

    /// Fetch a descendant inside the partial-failure boundary
    async fn fetch_descendant(
        &self,
        reference: &ObjectReference,
        ambient_ns: Option<String>,
    ) -> Option<Value> {
        let mut results = self
            .fetch_children(vec![reference.clone()], ambient_ns)
            .await;
        match results.pop() {
            Some((_, Ok(value))) => Some(value),
            Some((r, Err(e))) => {
                tracing::warn!("failed to fetch {}/{}: {}", r.kind, r.name, e);
                None
            }
            None => None,
        }
    }

    /// Fetch a sibling group with bounded fan-out. The graph append stays
    /// single-threaded, so the dedup set needs no lock.
    async fn fetch_children(
        &self,
        refs: Vec<ObjectReference>,
        ambient_ns: Option<String>,
    ) -> Vec<(ObjectReference, Result<Value, ResolveError>)> {
        let fan_out = self.options.fan_out.max(1);
        let deadline = self.options.deadline;
        let resolver = Arc::clone(&self.resolver);

        futures::stream::iter(refs.into_iter().map(move |reference| {
            let resolver = Arc::clone(&resolver);
            let ambient_ns = ambient_ns.clone();
            async move {
                let result = match deadline {
                    Some(d) => {
                        match tokio::time::timeout_at(
                            d,
                            resolver.resolve(&reference, ambient_ns.as_deref()),
                        )
                        .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(ResolveError::Upstream {
                                status: 0,
                                body: "deadline exceeded".to_string(),
                            }),
                        }
                    }
                    None => resolver.resolve(&reference, ambient_ns.as_deref()).await,
                };
                (reference, result)
            }
        }))
        .buffered(fan_out)
        .collect()
        .await
    }

    fn deadline_expired(&self) -> bool {
        self.options
            .deadline
            .map(|d| Instant::now() >= d)
            .unwrap_or(false)
    }
}

/// Try an ordered list of candidate accessors, returning the first field
/// that is present
fn first_present<'a>(obj: &'a Value, candidates: &[&[&str]]) -> Option<&'a Value> {
    for path in candidates {
        let mut current = obj;
        let mut found = true;
        for segment in *path {
            match current.get(segment) {
                Some(next) => current = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found && !current.is_null() {
            return Some(current);
        }
    }
    None
}

/// Construct an `ObjectReference` from a raw reference entry
fn parse_reference(value: &Value) -> Result<ObjectReference, ResolveError> {
    ObjectReference::from_fields(
        value.get("apiVersion").and_then(|v| v.as_str()),
        value.get("kind").and_then(|v| v.as_str()),
        value.get("name").and_then(|v| v.as_str()),
        value.get("namespace").and_then(|v| v.as_str()),
    )
}

fn classify_context(obj: &Value, identity: &RootIdentity, position: TraversalPosition) -> ClassifyContext {
    let instance_label = label(obj, INSTANCE_ID_LABEL);
    let rgd_label = label(obj, RGD_ID_LABEL);
    let owned = label(obj, OWNED_LABEL).map(|v| v == "true").unwrap_or(false);
    let has_ownership_labels = owned || instance_label.is_some();

    let labels_match_root = match (&identity.instance_id, instance_label) {
        (Some(root_id), Some(obj_id)) if root_id == obj_id => match (&identity.rgd_id, rgd_label) {
            (Some(root_rgd), Some(obj_rgd)) => root_rgd == obj_rgd,
            (Some(_), None) => false,
            (None, _) => true,
        },
        _ => false,
    };

    let uid = obj
        .get("metadata")
        .and_then(|m| m.get("uid"))
        .and_then(|u| u.as_str());
    let uid_matches_root = match (&identity.uid, uid) {
        (Some(root_uid), Some(obj_uid)) => root_uid == obj_uid,
        _ => false,
    };

    ClassifyContext {
        has_ownership_labels,
        labels_match_root,
        uid_matches_root,
        position,
    }
}

fn label<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get("metadata")
        .and_then(|m| m.get("labels"))
        .and_then(|l| l.get(key))
        .and_then(|v| v.as_str())
}

fn annotation<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get("metadata")
        .and_then(|m| m.get("annotations"))
        .and_then(|a| a.get(key))
        .and_then(|v| v.as_str())
}
