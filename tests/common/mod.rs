//! In-memory `ClusterApi` used by the integration tests.

#![allow(dead_code)]

use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::Resource;
use kube_radar::collector::{ApiError, ClusterApi, ClusterObject};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

/// Objects keyed by (Kind, namespace); cluster-scoped kinds use "".
#[derive(Default, Clone)]
pub struct FakeCluster {
    version: String,
    objects: HashMap<(String, String), Vec<Value>>,
    failing: HashSet<(String, String)>,
    version_fails: bool,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self {
            version: "v1.29.4".to_string(),
            ..Self::default()
        }
    }

    pub fn with(mut self, kind: &str, namespace: &str, object: Value) -> Self {
        self.objects
            .entry((kind.to_string(), namespace.to_string()))
            .or_default()
            .push(object);
        self
    }

    pub fn failing(mut self, kind: &str, namespace: &str) -> Self {
        self.failing.insert((kind.to_string(), namespace.to_string()));
        self
    }

    pub fn failing_version(mut self) -> Self {
        self.version_fails = true;
        self
    }

    /// Add a namespace object.
    pub fn namespace(self, name: &str) -> Self {
        self.with(
            "Namespace",
            "",
            json!({ "metadata": { "name": name }, "status": { "phase": "Active" } }),
        )
    }

    fn list<K: ClusterObject>(&self, namespace: &str) -> Result<Vec<K>, ApiError> {
        let key = (K::kind(&()).to_string(), namespace.to_string());
        if self.failing.contains(&key) {
            return Err(ApiError::Other(format!(
                "{} is forbidden in '{}'",
                key.0, namespace
            )));
        }
        self.objects
            .get(&key)
            .map(|values| {
                values
                    .iter()
                    .map(|v| serde_json::from_value(v.clone()))
                    .collect::<Result<Vec<K>, _>>()
                    .map_err(|e| ApiError::Other(e.to_string()))
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl ClusterApi for FakeCluster {
    fn api_server(&self) -> String {
        "https://fake.cluster.local:6443".to_string()
    }

    async fn server_version(&self) -> Result<String, ApiError> {
        if self.version_fails {
            return Err(ApiError::Other("connection refused".to_string()));
        }
        Ok(self.version.clone())
    }

    async fn list_cluster<K>(&self) -> Result<Vec<K>, ApiError>
    where
        K: ClusterObject + Resource<Scope = ClusterResourceScope>,
    {
        self.list("")
    }

    async fn list_namespaced<K>(&self, namespace: &str) -> Result<Vec<K>, ApiError>
    where
        K: ClusterObject + Resource<Scope = NamespaceResourceScope>,
    {
        self.list(namespace)
    }
}

pub fn pod(name: &str, namespace: &str, privileged: bool) -> Value {
    json!({
        "metadata": {
            "name": name,
            "namespace": namespace,
            "creationTimestamp": "2024-03-01T10:00:00Z",
            "labels": { "app": name }
        },
        "spec": {
            "nodeName": "worker-1",
            "serviceAccountName": "default",
            "containers": [{
                "name": "main",
                "image": "registry.local/app:1.0",
                "securityContext": { "privileged": privileged }
            }]
        }
    })
}

/// Three namespaces with one pod each, plus the RBAC objects every run needs.
pub fn three_namespace_cluster() -> FakeCluster {
    FakeCluster::new()
        .with(
            "Node",
            "",
            json!({
                "metadata": { "name": "worker-1" },
                "status": {
                    "conditions": [{ "type": "Ready", "status": "True" }],
                    "nodeInfo": { "operatingSystem": "linux", "architecture": "amd64",
                                  "kubeletVersion": "v1.29.4", "containerRuntimeVersion": "containerd://1.7.0" }
                }
            }),
        )
        .namespace("team-a")
        .namespace("team-b")
        .namespace("team-c")
        .with(
            "ClusterRole",
            "",
            json!({
                "metadata": { "name": "view" },
                "rules": [{ "apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"] }]
            }),
        )
        .with(
            "ClusterRoleBinding",
            "",
            json!({
                "metadata": { "name": "view-all" },
                "roleRef": { "apiGroup": "rbac.authorization.k8s.io", "kind": "ClusterRole", "name": "view" },
                "subjects": [{ "kind": "Group", "name": "auditors" }]
            }),
        )
        .with("Pod", "team-a", pod("api", "team-a", false))
        .with("Pod", "team-b", pod("worker", "team-b", true))
        .with("Pod", "team-c", pod("web", "team-c", false))
        .with(
            "Secret",
            "team-a",
            json!({
                "metadata": { "name": "db-credentials", "namespace": "team-a" },
                "type": "Opaque",
                "data": { "password": "c2VjcmV0" }
            }),
        )
}
