//! Output rendering
//!
//! The graph is serialized either as the JSON payload consumers expect
//! (`{"resources": [...]}`) or as a flattened table indented by level.

use serde::Serialize;

use crate::graph::models::{ResourceGraph, ResourceNode};

/// JSON payload returned to consumers
#[derive(Debug, Serialize)]
pub struct GraphResponse<'a> {
    pub resources: &'a [ResourceNode],
}

/// Serialize the graph as pretty-printed JSON
pub fn to_json(graph: &ResourceGraph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&GraphResponse {
        resources: graph.nodes(),
    })
}

/// Render the graph as a table, one row per node, indented by level
pub fn to_table(graph: &ResourceGraph) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<50} {:<18} {:<14} {:>6} {:>7}\n",
        "NAME", "KIND", "TYPE", "READY", "SYNCED"
    ));
    for node in graph.nodes() {
        let indent = "  ".repeat(node.level as usize);
        let name = match &node.namespace {
            Some(ns) => format!("{}{}/{}", indent, ns, node.name),
            None => format!("{}{}", indent, node.name),
        };
        out.push_str(&format!(
            "{:<50} {:<18} {:<14} {:>6} {:>7}\n",
            name,
            node.kind,
            node_type_label(node),
            if node.status.ready { "True" } else { "False" },
            if node.status.synced { "True" } else { "False" },
        ));
    }
    out
}

fn node_type_label(node: &ResourceNode) -> &'static str {
    use crate::graph::models::NodeType;
    match node.node_type {
        NodeType::Claim => "Claim",
        NodeType::Composite => "Composite",
        NodeType::ManagedResource => "Managed",
        NodeType::Xrd => "XRD",
        NodeType::Instance => "Instance",
        NodeType::Rgd => "RGD",
        NodeType::Crd => "CRD",
        NodeType::GenericResource => "Resource",
    }
}
