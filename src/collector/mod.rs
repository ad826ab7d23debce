//! Cluster snapshot collection.
//!
//! The [`Collector`] drives five sub-collectors in a fixed order (cluster and
//! nodes, RBAC, workloads, network, secrets) and assembles one
//! [`AssessmentData`].
//!
//! # Failure policy
//!
//! - The server version and every cluster-scoped listing (nodes, namespaces,
//!   cluster roles, cluster role bindings) are required. The first failure
//!   aborts collection with a [`CollectError`] naming the resource kind.
//! - A namespaced listing that fails only drops that kind for that namespace.
//!   The failure is recorded as a [`CollectionWarning`] in the returned
//!   [`Collection`] and collection continues.
//!
//! Nothing is retried.
//!
//! # Ordering
//!
//! Namespaces are visited through a bounded, order-preserving fan-out and
//! every namespaced sequence is re-sorted by `(namespace, name)` before it is
//! returned, so the snapshot does not depend on response timing.

pub mod api;
pub mod cluster;
pub mod network;
pub mod rbac;
pub mod secrets;
pub mod workload;

pub use api::{ApiError, ClusterApi, ClusterObject, ConnectError, KubeClusterApi, list_contexts};

use crate::models::AssessmentData;
use futures_util::stream::{self, StreamExt};
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Default number of namespaces queried at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Kinds of objects the collectors enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Nodes,
    Namespaces,
    ClusterRoles,
    ClusterRoleBindings,
    Roles,
    RoleBindings,
    ServiceAccounts,
    Pods,
    Deployments,
    StatefulSets,
    DaemonSets,
    Services,
    NetworkPolicies,
    Ingresses,
    Secrets,
}

impl ResourceKind {
    /// Plural API name, as used by `kubectl get`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Namespaces => "namespaces",
            Self::ClusterRoles => "clusterroles",
            Self::ClusterRoleBindings => "clusterrolebindings",
            Self::Roles => "roles",
            Self::RoleBindings => "rolebindings",
            Self::ServiceAccounts => "serviceaccounts",
            Self::Pods => "pods",
            Self::Deployments => "deployments",
            Self::StatefulSets => "statefulsets",
            Self::DaemonSets => "daemonsets",
            Self::Services => "services",
            Self::NetworkPolicies => "networkpolicies",
            Self::Ingresses => "ingresses",
            Self::Secrets => "secrets",
        }
    }

    /// Whether the kind exists once per cluster rather than per namespace.
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(
            self,
            Self::Nodes | Self::Namespaces | Self::ClusterRoles | Self::ClusterRoleBindings
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal collection errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Failed to query server version: {0}")]
    Version(#[source] ApiError),

    #[error("Failed to list {kind}: {source}")]
    ClusterScoped {
        kind: ResourceKind,
        #[source]
        source: ApiError,
    },
}

impl CollectError {
    /// The resource kind whose listing failed, if any.
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Self::Version(_) => None,
            Self::ClusterScoped { kind, .. } => Some(*kind),
        }
    }
}

/// A namespaced listing that failed and was left out of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionWarning {
    pub kind: ResourceKind,
    pub namespace: String,
    pub message: String,
}

impl fmt::Display for CollectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in namespace '{}' omitted: {}",
            self.kind, self.namespace, self.message
        )
    }
}

/// Result of a collection run: the assembled model plus every namespace-level
/// omission, ordered by namespace then kind.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub data: AssessmentData,
    pub warnings: Vec<CollectionWarning>,
}

impl Collection {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Collects a cluster snapshot through a [`ClusterApi`].
pub struct Collector<C> {
    api: C,
    concurrency: usize,
}

impl<C: ClusterApi> Collector<C> {
    pub fn new(api: C) -> Self {
        Self {
            api,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set how many namespaces are queried at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    /// Collect the full snapshot.
    pub async fn collect_all(&self) -> Result<Collection, CollectError> {
        let mut warnings = Vec::new();

        let cluster_info = self.collect_cluster_info().await?;
        let rbac = self.collect_rbac(&mut warnings).await?;
        let workloads = self.collect_workloads(&mut warnings).await?;
        let network = self.collect_network(&mut warnings).await?;
        let secrets = self.collect_secrets(&mut warnings).await?;

        warnings.sort_by(|a, b| (&a.namespace, a.kind).cmp(&(&b.namespace, b.kind)));

        log::info!(
            "Collected {} nodes, {} namespaces, {} pods ({} warnings)",
            cluster_info.node_count,
            cluster_info.namespaces.len(),
            workloads.pods.len(),
            warnings.len()
        );

        Ok(Collection {
            data: AssessmentData {
                cluster_info,
                rbac,
                workloads,
                network,
                secrets,
            },
            warnings,
        })
    }

    /// List a required cluster-scoped kind.
    async fn list_required<K>(&self, kind: ResourceKind) -> Result<Vec<K>, CollectError>
    where
        K: ClusterObject + Resource<Scope = k8s_openapi::ClusterResourceScope>,
    {
        let items = self
            .api
            .list_cluster::<K>()
            .await
            .map_err(|source| CollectError::ClusterScoped { kind, source })?;
        log::debug!("Listed {} {}", items.len(), kind);
        Ok(items)
    }

    /// Names of all namespaces. Required by every namespaced sub-collector.
    async fn namespace_names(&self) -> Result<Vec<String>, CollectError> {
        let namespaces = self
            .list_required::<k8s_openapi::api::core::v1::Namespace>(ResourceKind::Namespaces)
            .await?;
        Ok(namespaces
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    /// List a namespaced kind, turning a failure into a warning.
    async fn list_optional<K>(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> Result<Vec<K>, CollectionWarning>
    where
        K: ClusterObject + Resource<Scope = NamespaceResourceScope>,
    {
        self.api
            .list_namespaced::<K>(namespace)
            .await
            .map_err(|e| {
                let warning = CollectionWarning {
                    kind,
                    namespace: namespace.to_string(),
                    message: e.to_string(),
                };
                log::warn!("{}", warning);
                warning
            })
    }

    /// Visit every namespace with at most `concurrency` visits in flight.
    /// Results come back in namespace order.
    async fn per_namespace<'a, T, F, Fut>(&'a self, namespaces: Vec<String>, visit: F) -> Vec<T>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = T> + 'a,
    {
        stream::iter(namespaces)
            .map(visit)
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Append a namespaced listing to `into`, or record its warning.
fn merge_listing<K, T>(
    listing: Result<Vec<K>, CollectionWarning>,
    into: &mut Vec<T>,
    warnings: &mut Vec<CollectionWarning>,
    convert: impl Fn(K) -> T,
) {
    match listing {
        Ok(items) => into.extend(items.into_iter().map(convert)),
        Err(warning) => warnings.push(warning),
    }
}

/// Models that live in a namespace.
pub(crate) trait Namespaced {
    fn sort_key(&self) -> (&str, &str);
}

macro_rules! impl_namespaced {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Namespaced for $ty {
                fn sort_key(&self) -> (&str, &str) {
                    (&self.namespace, &self.name)
                }
            }
        )*
    };
}

impl_namespaced!(
    crate::models::RoleInfo,
    crate::models::BindingInfo,
    crate::models::ServiceAccountInfo,
    crate::models::PodInfo,
    crate::models::DeploymentInfo,
    crate::models::StatefulSetInfo,
    crate::models::DaemonSetInfo,
    crate::models::ServiceInfo,
    crate::models::NetworkPolicyInfo,
    crate::models::IngressInfo,
    crate::models::SecretInfo,
);

/// Stable sort by `(namespace, name)`.
pub(crate) fn sort_namespaced<T: Namespaced>(items: &mut [T]) {
    items.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

// ============================================================================
// Metadata helpers shared by the sub-collectors
// ============================================================================

pub(crate) fn name_of(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

pub(crate) fn namespace_of(meta: &ObjectMeta) -> String {
    meta.namespace.clone().unwrap_or_default()
}

pub(crate) fn labels_of(meta: &ObjectMeta) -> crate::models::Labels {
    meta.labels.clone().unwrap_or_default()
}

/// RFC 3339 creation timestamp, empty when absent.
pub(crate) fn created_at(meta: &ObjectMeta) -> String {
    meta.creation_timestamp
        .as_ref()
        .map(|t| t.0.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PodInfo;

    fn pod(namespace: &str, name: &str) -> PodInfo {
        PodInfo {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_namespaced_orders_by_namespace_then_name() {
        let mut pods = vec![pod("b", "a"), pod("a", "z"), pod("a", "b")];
        sort_namespaced(&mut pods);
        let keys: Vec<_> = pods.iter().map(|p| (p.namespace.as_str(), p.name.as_str())).collect();
        assert_eq!(keys, vec![("a", "b"), ("a", "z"), ("b", "a")]);
    }

    #[test]
    fn test_resource_kind_scope() {
        assert!(ResourceKind::ClusterRoles.is_cluster_scoped());
        assert!(ResourceKind::Namespaces.is_cluster_scoped());
        assert!(!ResourceKind::Pods.is_cluster_scoped());
        assert_eq!(ResourceKind::NetworkPolicies.to_string(), "networkpolicies");
    }

    #[test]
    fn test_warning_display() {
        let warning = CollectionWarning {
            kind: ResourceKind::Pods,
            namespace: "team-b".to_string(),
            message: "forbidden".to_string(),
        };
        assert_eq!(warning.to_string(), "pods in namespace 'team-b' omitted: forbidden");
    }

    #[test]
    fn test_created_at_empty_when_missing() {
        assert_eq!(created_at(&ObjectMeta::default()), "");
    }
}
