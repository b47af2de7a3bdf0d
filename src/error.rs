//! Error taxonomy for graph resolution
//!
//! Root-path errors propagate to the caller as a single terminal failure;
//! descendant-path errors are caught at the point of use, logged, and the
//! reference is excluded from the graph.

use thiserror::Error;

/// Errors produced while resolving object references and walking graphs
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The object is absent at the attempted path. This is the only error
    /// that triggers the namespaced-to-cluster scope fallback.
    #[error("object not found")]
    NotFound,

    /// The root locator matched more than one candidate (caller-facing)
    #[error("ambiguous root reference: {0}")]
    Ambiguous(String),

    /// A non-404 failure response from the API server
    #[error("upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    /// A reference field is missing required parts (e.g. an unparsable
    /// apiVersion). Treated as a descendant failure and skipped.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound)
    }
}

impl From<kube::Error> for ResolveError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 404 => ResolveError::NotFound,
            kube::Error::Api(resp) => ResolveError::Upstream {
                status: resp.code,
                body: resp.message,
            },
            other => ResolveError::Upstream {
                status: 0,
                body: other.to_string(),
            },
        }
    }
}
