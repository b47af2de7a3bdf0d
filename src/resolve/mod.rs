//! Reference resolution
//!
//! Computes REST paths for object references (group, version, scope,
//! kind-to-plural) and fetches them with scope fallback.

pub mod plural;
pub mod reference;
pub mod resolver;
pub mod transport;

pub use plural::PluralRules;
pub use reference::{ObjectReference, PathScope};
pub use resolver::ReferenceResolver;
pub use transport::{KubeTransport, ObjectTransport};
