//! Classifier behavior through the public API
//!
//! classify is a pure function: identical (kind, context) inputs always
//! yield the same node type, and kind-suffix checks take priority over
//! label-based checks.

use crossgraph::graph::classify::{classify, ClassifyContext, TraversalPosition};
use crossgraph::graph::models::NodeType;

fn labeled(position: TraversalPosition) -> ClassifyContext {
    ClassifyContext {
        has_ownership_labels: true,
        labels_match_root: false,
        uid_matches_root: false,
        position,
    }
}

#[test]
fn test_definition_kinds_win_over_everything() {
    for kind in [
        "CompositeResourceDefinition",
        "ResourceGraphDefinition",
        "CustomResourceDefinition",
    ] {
        let with_labels = labeled(TraversalPosition::Managed);
        let without = ClassifyContext::default();
        assert_eq!(classify(kind, with_labels), classify(kind, without));
    }
    assert_eq!(
        classify("CompositeResourceDefinition", labeled(TraversalPosition::Managed)),
        NodeType::Xrd
    );
    assert_eq!(
        classify("ResourceGraphDefinition", ClassifyContext::default()),
        NodeType::Rgd
    );
    assert_eq!(
        classify("CustomResourceDefinition", ClassifyContext::default()),
        NodeType::Crd
    );
}

#[test]
fn test_claim_suffix() {
    assert_eq!(
        classify("PostgresClaim", ClassifyContext::default()),
        NodeType::Claim
    );
    // Suffix check only, prefix does not count
    assert_eq!(
        classify("ClaimChecker", ClassifyContext::default()),
        NodeType::GenericResource
    );
}

#[test]
fn test_instance_vs_owned_resource() {
    let instance = ClassifyContext {
        has_ownership_labels: true,
        labels_match_root: true,
        uid_matches_root: true,
        position: TraversalPosition::Unpositioned,
    };
    assert_eq!(classify("WebApp", instance), NodeType::Instance);

    let owned = ClassifyContext {
        uid_matches_root: false,
        ..instance
    };
    assert_eq!(classify("Deployment", owned), NodeType::ManagedResource);
}

#[test]
fn test_structural_classification_without_labels() {
    assert_eq!(
        classify("XNetwork", labeled_off(TraversalPosition::Composite)),
        NodeType::Composite
    );
    assert_eq!(
        classify("Bucket", labeled_off(TraversalPosition::Managed)),
        NodeType::ManagedResource
    );
    assert_eq!(
        classify("ConfigMap", labeled_off(TraversalPosition::Unpositioned)),
        NodeType::GenericResource
    );
}

fn labeled_off(position: TraversalPosition) -> ClassifyContext {
    ClassifyContext {
        position,
        ..Default::default()
    }
}

#[test]
fn test_classification_is_idempotent() {
    let kinds = ["NetworkClaim", "XNetwork", "Bucket", "ConfigMap", "WebApp"];
    let contexts = [
        ClassifyContext::default(),
        labeled(TraversalPosition::Managed),
        labeled_off(TraversalPosition::Composite),
    ];
    for kind in kinds {
        for ctx in contexts {
            assert_eq!(classify(kind, ctx), classify(kind, ctx));
        }
    }
}
