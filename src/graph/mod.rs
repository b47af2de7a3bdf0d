//! Dependency graph resolution
//!
//! Walks a chain of typed reference fields from one root object to
//! reconstruct the ownership/composition tree that makes it up.

pub mod classify;
pub mod models;
pub mod status;
pub mod walker;

pub use classify::{classify, ClassifyContext, TraversalPosition};
pub use models::{Condition, NodeStatus, NodeType, ResourceGraph, ResourceNode};
pub use status::normalize;
pub use walker::{GraphWalker, ResolveOptions, TraversalProfile};
