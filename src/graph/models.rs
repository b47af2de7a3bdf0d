//! Graph data structures
//!
//! A `ResourceGraph` is the ordered sequence of nodes produced by one
//! resolution, in discovery order (root first, parents before children).
//! It is constructed fresh per resolution and discarded after being
//! serialized to the caller.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single status condition as reported by the object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    /// "True" | "False" | "Unknown"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Reduced status plus the raw condition list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStatus {
    pub ready: bool,
    pub synced: bool,
    pub conditions: Vec<Condition>,
}

/// Semantic node type assigned by the classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Claim,
    Composite,
    ManagedResource,
    #[serde(rename = "XRD")]
    Xrd,
    Instance,
    #[serde(rename = "RGD")]
    Rgd,
    #[serde(rename = "CRD")]
    Crd,
    GenericResource,
}

/// One resolved object in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    /// Object uid, or a synthesized "kind-name" fallback when uid is absent
    pub id: String,
    pub node_type: NodeType,
    pub kind: String,
    pub group: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// The raw fetched document, never mutated outside this node
    pub raw: Value,
    /// Distance from the root (root = 0)
    pub level: u32,
    /// Absent only for the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Ordered node sequence with a uniqueness index by id
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    node_index: HashMap<String, usize>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node unless one with the same id is already present.
    /// Returns whether the node was added.
    pub fn add_node(&mut self, node: ResourceNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ResourceNode> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_nodes(self) -> Vec<ResourceNode> {
        self.nodes
    }
}
