//! Server version, nodes and namespaces.

use super::{ClusterApi, CollectError, Collector, ResourceKind, created_at, labels_of, name_of};
use crate::models::{ClusterInfo, NamespaceInfo, NodeInfo};
use k8s_openapi::api::core::v1::{Namespace, Node};

impl<C: ClusterApi> Collector<C> {
    /// Everything in this step is required: any failure aborts collection.
    pub(crate) async fn collect_cluster_info(&self) -> Result<ClusterInfo, CollectError> {
        let version = self
            .api
            .server_version()
            .await
            .map_err(CollectError::Version)?;
        log::debug!("API server version {}", version);

        let nodes: Vec<Node> = self.list_required(ResourceKind::Nodes).await?;
        let namespaces: Vec<Namespace> = self.list_required(ResourceKind::Namespaces).await?;

        let nodes: Vec<NodeInfo> = nodes.iter().map(node_from).collect();
        let platform = nodes.first().map(|n| n.os.clone()).unwrap_or_default();

        Ok(ClusterInfo {
            version,
            node_count: nodes.len(),
            api_server: self.api.api_server(),
            platform,
            nodes,
            namespaces: namespaces.iter().map(namespace_from).collect(),
        })
    }
}

pub fn node_from(node: &Node) -> NodeInfo {
    let status = node.status.as_ref();
    let info = status.and_then(|s| s.node_info.as_ref());
    let capacity = |key: &str| {
        status
            .and_then(|s| s.capacity.as_ref())
            .and_then(|c| c.get(key))
            .map(|q| q.0.clone())
            .unwrap_or_default()
    };

    // Only an explicit Ready=True condition counts.
    let ready = status
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
        .is_some_and(|c| c.status == "True");

    NodeInfo {
        name: name_of(&node.metadata),
        version: info.map(|i| i.kubelet_version.clone()).unwrap_or_default(),
        architecture: info.map(|i| i.architecture.clone()).unwrap_or_default(),
        os: info.map(|i| i.operating_system.clone()).unwrap_or_default(),
        container_runtime: info
            .map(|i| i.container_runtime_version.clone())
            .unwrap_or_default(),
        cpu: capacity("cpu"),
        memory: capacity("memory"),
        ready,
        labels: labels_of(&node.metadata),
    }
}

pub fn namespace_from(namespace: &Namespace) -> NamespaceInfo {
    NamespaceInfo {
        name: name_of(&namespace.metadata),
        status: namespace
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_default(),
        created_at: created_at(&namespace.metadata),
        labels: labels_of(&namespace.metadata),
    }
}
