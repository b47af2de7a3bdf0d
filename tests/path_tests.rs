//! Path construction and scope fallback tests
//!
//! The API server enforces these path shapes strictly, so they are pinned
//! down exactly: core group vs named group, namespaced vs cluster scope,
//! and the namespaced-then-cluster retry on 404.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::FakeTransport;
use crossgraph::error::ResolveError;
use crossgraph::resolve::plural::PluralRules;
use crossgraph::resolve::reference::{ObjectReference, PathScope};
use crossgraph::resolve::resolver::ReferenceResolver;

fn resolver(transport: FakeTransport) -> (ReferenceResolver, Arc<FakeTransport>) {
    let transport = Arc::new(transport);
    (
        ReferenceResolver::new(transport.clone(), PluralRules::new()),
        transport,
    )
}

#[test]
fn test_all_four_path_shapes() {
    let rules = PluralRules::new();

    let core_ns = ObjectReference::new("v1", "ConfigMap", "cm", Some("default"));
    assert_eq!(
        core_ns
            .rest_path(&rules, PathScope::Namespaced, None)
            .unwrap(),
        "/api/v1/namespaces/default/configmaps/cm"
    );

    let core_cluster = ObjectReference::new("v1", "Namespace", "prod", None);
    assert_eq!(
        core_cluster
            .rest_path(&rules, PathScope::Cluster, None)
            .unwrap(),
        "/api/v1/namespaces/prod"
    );

    let group_ns = ObjectReference::new("kro.run/v1alpha1", "WebApp", "shop", Some("team-a"));
    assert_eq!(
        group_ns
            .rest_path(&rules, PathScope::Namespaced, None)
            .unwrap(),
        "/apis/kro.run/v1alpha1/namespaces/team-a/webapps/shop"
    );

    let group_cluster =
        ObjectReference::new("apiextensions.crossplane.io/v1", "CompositeResourceDefinition", "xnets.example.org", None);
    assert_eq!(
        group_cluster
            .rest_path(&rules, PathScope::Cluster, None)
            .unwrap(),
        "/apis/apiextensions.crossplane.io/v1/compositeresourcedefinitions/xnets.example.org"
    );
}

#[test]
fn test_pluralization_exceptions_flow_into_paths() {
    let rules = PluralRules::new();
    let ingress = ObjectReference::new("networking.k8s.io/v1", "Ingress", "web", Some("default"));
    assert_eq!(
        ingress
            .rest_path(&rules, PathScope::Namespaced, None)
            .unwrap(),
        "/apis/networking.k8s.io/v1/namespaces/default/ingresses/web"
    );

    let proxy = ObjectReference::new("g.io/v1", "Proxy", "edge", None);
    assert_eq!(
        proxy.rest_path(&rules, PathScope::Cluster, None).unwrap(),
        "/apis/g.io/v1/proxies/edge"
    );
}

#[tokio::test]
async fn test_scope_fallback_namespaced_then_cluster() {
    let obj = json!({"apiVersion": "g.io/v1", "kind": "Widget", "metadata": {"name": "w"}});
    let transport = FakeTransport::new()
        .with_failure("/apis/g.io/v1/namespaces/default/widgets/w", 404)
        .with_object("/apis/g.io/v1/widgets/w", obj.clone());
    let (resolver, transport) = resolver(transport);

    let reference = ObjectReference::new("g.io/v1", "Widget", "w", None);
    let fetched = resolver.resolve(&reference, Some("default")).await.unwrap();
    assert_eq!(fetched, obj);

    // Namespaced path attempted first, cluster path second
    assert_eq!(
        transport.calls(),
        vec![
            "/apis/g.io/v1/namespaces/default/widgets/w".to_string(),
            "/apis/g.io/v1/widgets/w".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_non_404_does_not_trigger_fallback() {
    let transport =
        FakeTransport::new().with_failure("/apis/g.io/v1/namespaces/default/widgets/w", 500);
    let (resolver, transport) = resolver(transport);

    let reference = ObjectReference::new("g.io/v1", "Widget", "w", Some("default"));
    let err = resolver.resolve(&reference, None).await.unwrap_err();
    assert!(matches!(err, ResolveError::Upstream { status: 500, .. }));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_composite_kind_skips_namespaced_attempt() {
    let obj = json!({"apiVersion": "g.io/v1", "kind": "CompositeNetwork", "metadata": {"name": "x"}});
    let transport = FakeTransport::new().with_object("/apis/g.io/v1/compositenetworks/x", obj);
    let (resolver, transport) = resolver(transport);

    // Ambient namespace available, but composites are never namespaced
    let reference = ObjectReference::new("g.io/v1", "CompositeNetwork", "x", Some("default"));
    resolver.resolve(&reference, None).await.unwrap();
    assert_eq!(
        transport.calls(),
        vec!["/apis/g.io/v1/compositenetworks/x".to_string()]
    );
}

#[tokio::test]
async fn test_no_namespace_goes_straight_to_cluster_scope() {
    let obj = json!({"apiVersion": "g.io/v1", "kind": "Widget", "metadata": {"name": "w"}});
    let transport = FakeTransport::new().with_object("/apis/g.io/v1/widgets/w", obj);
    let (resolver, transport) = resolver(transport);

    let reference = ObjectReference::new("g.io/v1", "Widget", "w", None);
    resolver.resolve(&reference, None).await.unwrap();
    assert_eq!(transport.calls(), vec!["/apis/g.io/v1/widgets/w".to_string()]);
}

#[tokio::test]
async fn test_list_unwraps_items() {
    let list = json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": [
            {"metadata": {"name": "a"}},
            {"metadata": {"name": "b"}},
        ]
    });
    let reference = ObjectReference::new("apps/v1", "Deployment", "", Some("default"));
    let path = reference
        .list_path(
            &PluralRules::new(),
            PathScope::Namespaced,
            None,
            Some("kro.run/owned=true"),
        )
        .unwrap();
    let transport = FakeTransport::new().with_object(&path, list);
    let (resolver, _) = resolver(transport);

    let items = resolver
        .list(&reference, None, "kro.run/owned=true")
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
}
