//! Crossgraph library
//!
//! Resolves the dependency graph of a Crossplane claim/composite or KRO
//! instance: starting from one root object, walks its typed reference
//! fields, classifies each discovered object, normalizes status, and
//! returns the accumulated node list even when some branches fail.

pub mod config;
pub mod error;
pub mod graph;
pub mod kube;
pub mod render;
pub mod resolve;
pub mod services;

// Re-export commonly used types for convenience
pub use error::ResolveError;
pub use graph::{
    GraphWalker, NodeStatus, NodeType, ResolveOptions, ResourceGraph, ResourceNode,
    TraversalProfile,
};
pub use resolve::{ObjectReference, ObjectTransport, PluralRules, ReferenceResolver};
pub use services::ResourceService;
