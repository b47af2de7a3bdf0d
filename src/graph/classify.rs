//! Node classification
//!
//! Maps (kind, context) to a semantic node type. Pure function: identical
//! inputs always yield the same type. Kind-suffix checks run before
//! label-based checks so a mislabeled definition object is never
//! miscategorized as a managed resource.

use crate::graph::models::NodeType;

/// Where the object sits in the active traversal profile. Crossplane v1
/// composites are identified structurally, not by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalPosition {
    /// The root of a claim-based walk
    Claim,
    /// The composite slot (claim profile level 1, composite profile root)
    Composite,
    /// A managed-resource leaf
    Managed,
    /// No structural hint
    Unpositioned,
}

/// Label/uid evidence gathered from the object and the active root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifyContext {
    /// Carries the instance/definition ownership labels at all
    pub has_ownership_labels: bool,
    /// Those labels match the active root's instance and definition ids
    pub labels_match_root: bool,
    /// The object's uid equals the root instance's uid
    pub uid_matches_root: bool,
    pub position: TraversalPosition,
}

impl Default for TraversalPosition {
    fn default() -> Self {
        TraversalPosition::Unpositioned
    }
}

/// Classify an object into its semantic node type
pub fn classify(kind: &str, ctx: ClassifyContext) -> NodeType {
    if kind.ends_with("Claim") {
        return NodeType::Claim;
    }
    match kind {
        "CompositeResourceDefinition" => return NodeType::Xrd,
        "ResourceGraphDefinition" => return NodeType::Rgd,
        "CustomResourceDefinition" => return NodeType::Crd,
        _ => {}
    }
    if ctx.labels_match_root && ctx.uid_matches_root {
        return NodeType::Instance;
    }
    if ctx.has_ownership_labels {
        return NodeType::ManagedResource;
    }
    match ctx.position {
        TraversalPosition::Claim => NodeType::Claim,
        TraversalPosition::Composite => NodeType::Composite,
        TraversalPosition::Managed => NodeType::ManagedResource,
        TraversalPosition::Unpositioned => NodeType::GenericResource,
    }
}
