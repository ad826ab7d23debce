//! Assessment model.
//!
//! Every type here is a normalized, point-in-time snapshot of cluster state.
//! Collectors build them once; the report and summary only read them.

pub mod posture;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use posture::{KeyMetric, KeyMetrics, MetricValue, PodSecuritySummary, RbacSummary};

/// Label or annotation mapping as returned by the API server.
pub type Labels = BTreeMap<String, String>;

/// Root aggregate produced by [`crate::collector::Collector::collect_all`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentData {
    pub cluster_info: ClusterInfo,
    pub rbac: RbacAssessment,
    pub workloads: WorkloadAssessment,
    pub network: NetworkAssessment,
    pub secrets: SecretAssessment,
}

// ============================================================================
// Cluster
// ============================================================================

/// Control-plane and node overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Server `gitVersion`, e.g. `v1.30.2`
    pub version: String,
    pub node_count: usize,
    /// API endpoint the snapshot was taken from
    pub api_server: String,
    /// Operating system of the first enumerated node
    pub platform: String,
    pub nodes: Vec<NodeInfo>,
    pub namespaces: Vec<NamespaceInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    /// Kubelet version
    pub version: String,
    pub architecture: String,
    pub os: String,
    pub container_runtime: String,
    /// CPU capacity, kept as the raw quantity string
    pub cpu: String,
    /// Memory capacity, kept as the raw quantity string
    pub memory: String,
    pub ready: bool,
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    pub name: String,
    /// Namespace phase (`Active`, `Terminating`)
    pub status: String,
    pub created_at: String,
    pub labels: Labels,
}

// ============================================================================
// RBAC
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RbacAssessment {
    pub cluster_roles: Vec<RoleInfo>,
    pub cluster_role_bindings: Vec<BindingInfo>,
    pub roles: Vec<RoleInfo>,
    pub role_bindings: Vec<BindingInfo>,
    pub service_accounts: Vec<ServiceAccountInfo>,
}

/// A Role or ClusterRole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub name: String,
    /// Empty for cluster roles
    pub namespace: String,
    pub cluster_role: bool,
    pub rules: Vec<PolicyRule>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub api_groups: Vec<String>,
    pub resources: Vec<String>,
    pub resource_names: Vec<String>,
    pub verbs: Vec<String>,
}

/// A RoleBinding or ClusterRoleBinding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingInfo {
    pub name: String,
    /// Empty for cluster role bindings
    pub namespace: String,
    /// Name of the referenced role
    pub role_ref: String,
    pub subjects: Vec<Subject>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountInfo {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub created_at: String,
    pub secrets: Vec<String>,
    pub image_pull_secrets: Vec<String>,
}

// ============================================================================
// Workloads
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadAssessment {
    pub pods: Vec<PodInfo>,
    pub deployments: Vec<DeploymentInfo>,
    pub stateful_sets: Vec<StatefulSetInfo>,
    pub daemon_sets: Vec<DaemonSetInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub node_name: String,
    pub service_account: String,
    pub labels: Labels,
    pub created_at: String,
    pub security_context: PodSecurityInfo,
    pub containers: Vec<ContainerInfo>,
    /// `None` means the API default (token mounted)
    pub automount_service_account_token: Option<bool>,
}

/// Pod-level security settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSecurityInfo {
    pub run_as_user: Option<i64>,
    pub run_as_group: Option<i64>,
    pub fs_group: Option<i64>,
    pub host_network: bool,
    pub host_pid: bool,
    pub host_ipc: bool,
    /// Namespaced sysctls as `name=value`
    pub sysctls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub name: String,
    pub image: String,
    pub security_context: ContainerSecurityInfo,
    pub resources: ResourceRequirements,
    /// Declared variable names. Values are never captured.
    pub env_vars: Vec<String>,
}

/// Container-level security settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSecurityInfo {
    /// `+NAME` for added capabilities followed by `-NAME` for dropped ones
    pub capabilities: Vec<String>,
    pub run_as_user: Option<i64>,
    pub run_as_non_root: Option<bool>,
    pub read_only_root: bool,
    pub privileged: bool,
    pub allow_privilege_escalation: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub limits: ResourceList,
    pub requests: ResourceList,
}

/// CPU and memory quantities as raw strings (units vary, nothing is parsed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceList {
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub update_strategy: String,
    pub labels: Labels,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatefulSetInfo {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub update_strategy: String,
    pub labels: Labels,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonSetInfo {
    pub name: String,
    pub namespace: String,
    pub update_strategy: String,
    pub labels: Labels,
    pub created_at: String,
}

// ============================================================================
// Network
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkAssessment {
    pub services: Vec<ServiceInfo>,
    pub network_policies: Vec<NetworkPolicyInfo>,
    pub ingresses: Vec<IngressInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub created_at: String,
    /// `ClusterIP`, `NodePort`, `LoadBalancer` or `ExternalName`
    pub service_type: String,
    pub cluster_ip: String,
    pub external_ips: Vec<String>,
    pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub port: i32,
    /// 0 when the target is unset or refers to a named port
    pub target_port: i32,
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkPolicyInfo {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub created_at: String,
    pub pod_selector: String,
    pub policy_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngressInfo {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub created_at: String,
    pub rules: Vec<IngressRule>,
    /// Hosts covered by TLS sections
    pub tls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub host: String,
    pub paths: Vec<IngressPath>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressPath {
    pub path: String,
    pub service_name: String,
    pub service_port: i32,
}

// ============================================================================
// Secrets
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretAssessment {
    pub secrets: Vec<SecretInfo>,
}

/// Secret metadata. The payload is never part of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretInfo {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub created_at: String,
    /// Declared secret type, e.g. `kubernetes.io/tls`
    pub secret_type: String,
}
