//! Object references and REST path construction
//!
//! An `ObjectReference` identifies one fetchable object by apiVersion, kind
//! and name, with an optional namespace. Resource location on the API server
//! depends on group, version and scope in non-uniform ways, so path
//! construction lives here and nowhere else.

use crate::error::ResolveError;
use crate::resolve::plural::PluralRules;

/// Scope to build a path for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// `/namespaces/{ns}/` segment included
    Namespaced,
    /// Cluster-scoped path, no namespace segment
    Cluster,
}

/// Identifies a fetchable Kubernetes-style object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    /// May encode group+version ("g/v") or just version ("v1")
    pub api_version: String,
    pub kind: String,
    pub name: String,
    /// Absent means the object is a candidate for cluster scope
    pub namespace: Option<String>,
}

impl ObjectReference {
    pub fn new(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.map(|s| s.to_string()),
        }
    }

    /// Construct from raw reference fields found on a parent object,
    /// validating the required parts
    pub fn from_fields(
        api_version: Option<&str>,
        kind: Option<&str>,
        name: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<Self, ResolveError> {
        let api_version = api_version
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResolveError::InvalidReference("missing apiVersion".to_string()))?;
        let kind = kind
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResolveError::InvalidReference("missing kind".to_string()))?;
        let name = name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResolveError::InvalidReference("missing name".to_string()))?;
        Ok(Self::new(api_version, kind, name, namespace))
    }

    /// Split apiVersion into (group, version). No "/" means the core group
    /// with an empty group name.
    pub fn group_version(&self) -> Result<(&str, &str), ResolveError> {
        match self.api_version.split_once('/') {
            Some((group, version)) => {
                if group.is_empty() || version.is_empty() {
                    return Err(ResolveError::InvalidReference(format!(
                        "unparsable apiVersion: {}",
                        self.api_version
                    )));
                }
                Ok((group, version))
            }
            None => {
                if self.api_version.is_empty() {
                    return Err(ResolveError::InvalidReference(
                        "empty apiVersion".to_string(),
                    ));
                }
                Ok(("", self.api_version.as_str()))
            }
        }
    }

    /// Build the REST path for fetching this object at the given scope.
    ///
    /// Core group + namespaced:  /api/{v}/namespaces/{ns}/{plural}/{name}
    /// Core group + cluster:     /api/{v}/{plural}/{name}
    /// Named group + namespaced: /apis/{g}/{v}/namespaces/{ns}/{plural}/{name}
    /// Named group + cluster:    /apis/{g}/{v}/{plural}/{name}
    ///
    /// The namespace for a namespaced path is the reference's own namespace,
    /// or the supplied ambient one when the reference carries none.
    pub fn rest_path(
        &self,
        rules: &PluralRules,
        scope: PathScope,
        ambient_namespace: Option<&str>,
    ) -> Result<String, ResolveError> {
        let (group, version) = self.group_version()?;
        if self.name.is_empty() {
            return Err(ResolveError::InvalidReference("empty name".to_string()));
        }
        let plural = rules.pluralize(&self.kind);
        let prefix = Self::group_prefix(group, version);

        match scope {
            PathScope::Namespaced => {
                let ns = self
                    .namespace
                    .as_deref()
                    .or(ambient_namespace)
                    .ok_or_else(|| {
                        ResolveError::InvalidReference(format!(
                            "no namespace available for {}/{}",
                            self.kind, self.name
                        ))
                    })?;
                Ok(format!(
                    "{}/namespaces/{}/{}/{}",
                    prefix, ns, plural, self.name
                ))
            }
            PathScope::Cluster => Ok(format!("{}/{}/{}", prefix, plural, self.name)),
        }
    }

    /// Build the REST path for listing this reference's resource type,
    /// with an optional label selector
    pub fn list_path(
        &self,
        rules: &PluralRules,
        scope: PathScope,
        ambient_namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<String, ResolveError> {
        let (group, version) = self.group_version()?;
        let plural = rules.pluralize(&self.kind);
        let prefix = Self::group_prefix(group, version);

        let base = match scope {
            PathScope::Namespaced => {
                let ns = self
                    .namespace
                    .as_deref()
                    .or(ambient_namespace)
                    .ok_or_else(|| {
                        ResolveError::InvalidReference(format!(
                            "no namespace available for listing {}",
                            self.kind
                        ))
                    })?;
                format!("{}/namespaces/{}/{}", prefix, ns, plural)
            }
            PathScope::Cluster => format!("{}/{}", prefix, plural),
        };

        match label_selector {
            Some(selector) => Ok(format!(
                "{}?labelSelector={}",
                base,
                urlencoding::encode(selector)
            )),
            None => Ok(base),
        }
    }

    /// Composite resources are never namespaced in the v1 composition model,
    /// so kinds that start or end with "Composite" always resolve
    /// cluster-scoped regardless of ambient namespace.
    pub fn is_always_cluster_scoped(&self) -> bool {
        self.kind.starts_with("Composite") || self.kind.ends_with("Composite")
    }

    fn group_prefix(group: &str, version: &str) -> String {
        if group.is_empty() {
            format!("/api/{}", version)
        } else {
            format!("/apis/{}/{}", group, version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PluralRules {
        PluralRules::new()
    }

    #[test]
    fn test_group_version_split() {
        let r = ObjectReference::new("example.org/v1alpha1", "Widget", "w", None);
        assert_eq!(r.group_version().unwrap(), ("example.org", "v1alpha1"));

        let core = ObjectReference::new("v1", "ConfigMap", "cm", None);
        assert_eq!(core.group_version().unwrap(), ("", "v1"));
    }

    #[test]
    fn test_group_version_invalid() {
        let r = ObjectReference::new("", "Widget", "w", None);
        assert!(matches!(
            r.group_version(),
            Err(ResolveError::InvalidReference(_))
        ));

        let r = ObjectReference::new("example.org/", "Widget", "w", None);
        assert!(matches!(
            r.group_version(),
            Err(ResolveError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_core_group_paths() {
        let r = ObjectReference::new("v1", "ConfigMap", "cm", Some("default"));
        assert_eq!(
            r.rest_path(&rules(), PathScope::Namespaced, None).unwrap(),
            "/api/v1/namespaces/default/configmaps/cm"
        );
        assert_eq!(
            r.rest_path(&rules(), PathScope::Cluster, None).unwrap(),
            "/api/v1/configmaps/cm"
        );
    }

    #[test]
    fn test_named_group_paths() {
        let r = ObjectReference::new("ec2.aws.upbound.io/v1beta1", "Instance", "vm", Some("prod"));
        assert_eq!(
            r.rest_path(&rules(), PathScope::Namespaced, None).unwrap(),
            "/apis/ec2.aws.upbound.io/v1beta1/namespaces/prod/instances/vm"
        );
        assert_eq!(
            r.rest_path(&rules(), PathScope::Cluster, None).unwrap(),
            "/apis/ec2.aws.upbound.io/v1beta1/instances/vm"
        );
    }

    #[test]
    fn test_ambient_namespace_default() {
        // Reference without its own namespace falls back to the parent's
        let r = ObjectReference::new("g.io/v1", "Widget", "w", None);
        assert_eq!(
            r.rest_path(&rules(), PathScope::Namespaced, Some("team-a"))
                .unwrap(),
            "/apis/g.io/v1/namespaces/team-a/widgets/w"
        );
        assert!(r.rest_path(&rules(), PathScope::Namespaced, None).is_err());
    }

    #[test]
    fn test_composite_kind_is_cluster_scoped() {
        assert!(ObjectReference::new("g/v1", "CompositeNetwork", "x", None)
            .is_always_cluster_scoped());
        assert!(ObjectReference::new("g/v1", "NetworkComposite", "x", None)
            .is_always_cluster_scoped());
        assert!(!ObjectReference::new("g/v1", "Network", "x", None).is_always_cluster_scoped());
    }

    #[test]
    fn test_list_path_with_selector() {
        let r = ObjectReference::new("apps/v1", "Deployment", "", Some("default"));
        let path = r
            .list_path(
                &rules(),
                PathScope::Namespaced,
                None,
                Some("kro.run/owned=true,kro.run/instance-id=abc"),
            )
            .unwrap();
        assert_eq!(
            path,
            "/apis/apps/v1/namespaces/default/deployments?labelSelector=kro.run%2Fowned%3Dtrue%2Ckro.run%2Finstance-id%3Dabc"
        );
    }
}
