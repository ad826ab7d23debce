//! Derived security-posture metrics.
//!
//! These values are computed from an [`AssessmentData`] for display only and
//! are never written back into the model.

use super::{AssessmentData, RbacAssessment, WorkloadAssessment};
use serde::Serialize;
use std::fmt;

/// Pod-level security totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PodSecuritySummary {
    pub total: usize,
    pub privileged: usize,
    pub host_network: usize,
    pub host_pid: usize,
    pub host_ipc: usize,
    pub run_as_root: usize,
}

impl PodSecuritySummary {
    /// Scan every pod once.
    ///
    /// A pod counts as privileged if any of its containers is privileged, and
    /// as run-as-root if any container explicitly sets `runAsUser: 0`. Each
    /// pod contributes at most one to each total.
    pub fn from_workloads(workloads: &WorkloadAssessment) -> Self {
        let mut summary = Self {
            total: workloads.pods.len(),
            ..Self::default()
        };

        for pod in &workloads.pods {
            if pod
                .containers
                .iter()
                .any(|c| c.security_context.privileged)
            {
                summary.privileged += 1;
            }
            if pod
                .containers
                .iter()
                .any(|c| c.security_context.run_as_user == Some(0))
            {
                summary.run_as_root += 1;
            }

            let sc = &pod.security_context;
            if sc.host_network {
                summary.host_network += 1;
            }
            if sc.host_pid {
                summary.host_pid += 1;
            }
            if sc.host_ipc {
                summary.host_ipc += 1;
            }
        }

        summary
    }

    /// Dashboard rows in display order.
    pub fn rows(&self) -> [(&'static str, usize); 6] {
        [
            ("Total Pods", self.total),
            ("Privileged", self.privileged),
            ("Host Network", self.host_network),
            ("Host PID", self.host_pid),
            ("Host IPC", self.host_ipc),
            ("RunAsRoot", self.run_as_root),
        ]
    }
}

/// Counts of RBAC objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RbacSummary {
    pub roles: usize,
    pub cluster_roles: usize,
    pub role_bindings: usize,
    pub cluster_role_bindings: usize,
    pub service_accounts: usize,
}

impl RbacSummary {
    pub fn from_rbac(rbac: &RbacAssessment) -> Self {
        Self {
            roles: rbac.roles.len(),
            cluster_roles: rbac.cluster_roles.len(),
            role_bindings: rbac.role_bindings.len(),
            cluster_role_bindings: rbac.cluster_role_bindings.len(),
            service_accounts: rbac.service_accounts.len(),
        }
    }

    /// Dashboard rows in display order.
    pub fn rows(&self) -> [(&'static str, usize); 5] {
        [
            ("Roles", self.roles),
            ("ClusterRoles", self.cluster_roles),
            ("RoleBindings", self.role_bindings),
            ("ClusterRoleBindings", self.cluster_role_bindings),
            ("ServiceAccounts", self.service_accounts),
        ]
    }
}

/// Value of a single key metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Text(String),
    Count(usize),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Count(count) => write!(f, "{}", count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMetric {
    pub label: &'static str,
    pub value: MetricValue,
}

/// The cluster overview list: the server version plus fifteen totals taken
/// straight from sequence lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMetrics {
    pub metrics: Vec<KeyMetric>,
}

impl KeyMetrics {
    pub fn from_assessment(data: &AssessmentData) -> Self {
        let count = |label: &'static str, n: usize| KeyMetric {
            label,
            value: MetricValue::Count(n),
        };

        let metrics = vec![
            KeyMetric {
                label: "Kubernetes Version",
                value: MetricValue::Text(data.cluster_info.version.clone()),
            },
            count("Total Nodes", data.cluster_info.node_count),
            count("Total Namespaces", data.cluster_info.namespaces.len()),
            count("Total Pods", data.workloads.pods.len()),
            count("Total Deployments", data.workloads.deployments.len()),
            count("Total StatefulSets", data.workloads.stateful_sets.len()),
            count("Total DaemonSets", data.workloads.daemon_sets.len()),
            count("Total Services", data.network.services.len()),
            count("Total Network Policies", data.network.network_policies.len()),
            count("Total Ingresses", data.network.ingresses.len()),
            count("Total Secrets", data.secrets.secrets.len()),
            count("Total Roles", data.rbac.roles.len()),
            count("Total ClusterRoles", data.rbac.cluster_roles.len()),
            count("Total RoleBindings", data.rbac.role_bindings.len()),
            count("Total ClusterRoleBindings", data.rbac.cluster_role_bindings.len()),
            count("Total ServiceAccounts", data.rbac.service_accounts.len()),
        ];

        Self { metrics }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyMetric> {
        self.metrics.iter()
    }
}
