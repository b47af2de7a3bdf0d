//! Status normalization
//!
//! Reduces an arbitrary condition list into ready/synced booleans. Which
//! condition type denotes readiness is profile-dependent: Crossplane
//! resources report `Ready`/`Synced`, KRO instances report a single
//! `InstanceSynced` condition that counts for both. Absence of a matching
//! condition means false, never an error. The full condition list is
//! preserved verbatim on the node.

use serde_json::Value;

use crate::graph::models::{Condition, NodeStatus};

const READY_TYPES: &[&str] = &["Ready", "InstanceSynced"];
const SYNCED_TYPES: &[&str] = &["Synced", "InstanceSynced"];

/// Reduce a condition list into a normalized status
pub fn normalize(conditions: Vec<Condition>) -> NodeStatus {
    let ready = has_true_condition(&conditions, READY_TYPES);
    let synced = has_true_condition(&conditions, SYNCED_TYPES);
    NodeStatus {
        ready,
        synced,
        conditions,
    }
}

/// Extract `status.conditions` from a raw object document. Malformed
/// entries are dropped rather than failing the whole object.
pub fn extract_conditions(obj: &Value) -> Vec<Condition> {
    obj.get("status")
        .and_then(|s| s.get("conditions"))
        .and_then(|c| c.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|c| serde_json::from_value(c.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn has_true_condition(conditions: &[Condition], types: &[&str]) -> bool {
    conditions
        .iter()
        .any(|c| types.contains(&c.condition_type.as_str()) && c.status == "True")
}
