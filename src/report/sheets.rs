//! Resource sheets: one header row and one row per entity.

use super::format::{
    format_capabilities, format_ingress_rules, format_labels, format_ports, format_rules,
    format_subjects, is_sensitive_env_name,
};
use super::workbook::{CellRange, CellRef, CellValue, Style, WorkbookSink};
use super::{Report, ReportError, Sheet};
use crate::models::{
    BindingInfo, DaemonSetInfo, DeploymentInfo, IngressInfo, NamespaceInfo, NetworkPolicyInfo,
    NodeInfo, PodInfo, RoleInfo, SecretInfo, ServiceAccountInfo, ServiceInfo, StatefulSetInfo,
};

/// A body cell with an optional style overriding the row style.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub emphasis: Option<Style>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            emphasis: None,
        }
    }
}

macro_rules! row {
    ($($cell:expr),* $(,)?) => {
        vec![$(Cell::new($cell)),*]
    };
}

/// Column index of the "Privileged" flag on the Pods sheet.
const POD_PRIVILEGED_COL: usize = 4;

/// Header row with an auto-filter, then one row per item.
///
/// Data rows start at row 2 and take their style from the row's parity.
pub fn write_table<W: WorkbookSink>(
    report: &mut Report<W>,
    sheet: Sheet,
    headers: &[&str],
    rows: impl IntoIterator<Item = Vec<Cell>>,
) -> Result<(), ReportError> {
    for (i, header) in headers.iter().enumerate() {
        report.write(sheet, CellRef::new(1, i as u16 + 1), *header, Style::Header)?;
    }
    report.autofilter(sheet, CellRange::row(1, 1, headers.len() as u16))?;

    let mut row = 2u32;
    for cells in rows {
        let base = Style::for_row(row);
        for (i, cell) in cells.into_iter().enumerate() {
            let style = cell.emphasis.unwrap_or(base);
            report.write(sheet, CellRef::new(row, i as u16 + 1), cell.value, style)?;
        }
        row += 1;
    }
    Ok(())
}

pub fn write_nodes<W: WorkbookSink>(
    report: &mut Report<W>,
    nodes: &[NodeInfo],
) -> Result<(), ReportError> {
    let headers = [
        "Name",
        "Version",
        "Architecture",
        "OS",
        "Container Runtime",
        "CPU",
        "Memory",
        "Ready",
        "Labels",
    ];
    let rows = nodes.iter().map(|n| {
        row![
            n.name.as_str(),
            n.version.as_str(),
            n.architecture.as_str(),
            n.os.as_str(),
            n.container_runtime.as_str(),
            n.cpu.as_str(),
            n.memory.as_str(),
            n.ready,
            format_labels(&n.labels),
        ]
    });
    write_table(report, Sheet::Nodes, &headers, rows)
}

pub fn write_namespaces<W: WorkbookSink>(
    report: &mut Report<W>,
    namespaces: &[NamespaceInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Status", "Created At", "Labels"];
    let rows = namespaces.iter().map(|ns| {
        row![
            ns.name.as_str(),
            ns.status.as_str(),
            ns.created_at.as_str(),
            format_labels(&ns.labels),
        ]
    });
    write_table(report, Sheet::Namespaces, &headers, rows)
}

fn container_resources(pod: &PodInfo) -> String {
    let mut lines = Vec::new();
    for c in &pod.containers {
        let entries = [
            ("CPU limit", &c.resources.limits.cpu),
            ("Memory limit", &c.resources.limits.memory),
            ("CPU request", &c.resources.requests.cpu),
            ("Memory request", &c.resources.requests.memory),
        ];
        for (label, value) in entries {
            if !value.is_empty() {
                lines.push(format!("{}: {} {}", c.name, label, value));
            }
        }
    }
    lines.join("\n")
}

fn pod_row(pod: &PodInfo) -> Vec<Cell> {
    let privileged = pod.containers.iter().any(|c| c.security_context.privileged);
    // True only when every container opts in explicitly.
    let run_as_non_root = !pod.containers.is_empty()
        && pod
            .containers
            .iter()
            .all(|c| c.security_context.run_as_non_root == Some(true));
    let run_as_user = match pod.security_context.run_as_user {
        Some(uid) => CellValue::from(uid),
        None => CellValue::from(""),
    };

    let names: Vec<&str> = pod.containers.iter().map(|c| c.name.as_str()).collect();
    let images: Vec<&str> = pod.containers.iter().map(|c| c.image.as_str()).collect();
    let capabilities: Vec<String> = pod
        .containers
        .iter()
        .flat_map(|c| c.security_context.capabilities.iter().cloned())
        .collect();
    let env_vars: Vec<&str> = pod
        .containers
        .iter()
        .flat_map(|c| c.env_vars.iter())
        .map(String::as_str)
        .filter(|name| !is_sensitive_env_name(name))
        .collect();

    let mut cells = row![
        pod.name.as_str(),
        pod.namespace.as_str(),
        pod.node_name.as_str(),
        pod.service_account.as_str(),
        privileged,
        pod.security_context.host_network,
        pod.security_context.host_pid,
        pod.security_context.host_ipc,
        run_as_user,
        run_as_non_root,
        // Unset means the API default: the token is mounted.
        pod.automount_service_account_token.unwrap_or(true),
        names.join("\n"),
        images.join("\n"),
        format_capabilities(&capabilities),
        container_resources(pod),
        pod.security_context.sysctls.join("\n"),
        env_vars.join("\n"),
        pod.created_at.as_str(),
        format_labels(&pod.labels),
    ];
    if privileged {
        cells[POD_PRIVILEGED_COL].emphasis = Some(Style::Critical);
    }
    cells
}

pub fn write_pods<W: WorkbookSink>(
    report: &mut Report<W>,
    pods: &[PodInfo],
) -> Result<(), ReportError> {
    let headers = [
        "Name",
        "Namespace",
        "Node",
        "Service Account",
        "Privileged",
        "Host Network",
        "Host PID",
        "Host IPC",
        "Run As User",
        "Run As Non Root",
        "Auto Mount SA Token",
        "Container Names",
        "Container Images",
        "Capabilities",
        "Resources",
        "Sysctls",
        "Environment Variables",
        "Created At",
        "Labels",
    ];
    write_table(report, Sheet::Pods, &headers, pods.iter().map(pod_row))
}

pub fn write_deployments<W: WorkbookSink>(
    report: &mut Report<W>,
    deployments: &[DeploymentInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Replicas", "Update Strategy", "Labels", "Created At"];
    let rows = deployments.iter().map(|d| {
        row![
            d.name.as_str(),
            d.namespace.as_str(),
            d.replicas,
            d.update_strategy.as_str(),
            format_labels(&d.labels),
            d.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::Deployments, &headers, rows)
}

pub fn write_stateful_sets<W: WorkbookSink>(
    report: &mut Report<W>,
    stateful_sets: &[StatefulSetInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Replicas", "Update Strategy", "Labels", "Created At"];
    let rows = stateful_sets.iter().map(|s| {
        row![
            s.name.as_str(),
            s.namespace.as_str(),
            s.replicas,
            s.update_strategy.as_str(),
            format_labels(&s.labels),
            s.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::StatefulSets, &headers, rows)
}

pub fn write_daemon_sets<W: WorkbookSink>(
    report: &mut Report<W>,
    daemon_sets: &[DaemonSetInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Update Strategy", "Labels", "Created At"];
    let rows = daemon_sets.iter().map(|d| {
        row![
            d.name.as_str(),
            d.namespace.as_str(),
            d.update_strategy.as_str(),
            format_labels(&d.labels),
            d.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::DaemonSets, &headers, rows)
}

pub fn write_services<W: WorkbookSink>(
    report: &mut Report<W>,
    services: &[ServiceInfo],
) -> Result<(), ReportError> {
    let headers = [
        "Name",
        "Namespace",
        "Type",
        "Cluster IP",
        "External IP",
        "Ports",
        "Labels",
        "Created At",
    ];
    let rows = services.iter().map(|s| {
        row![
            s.name.as_str(),
            s.namespace.as_str(),
            s.service_type.as_str(),
            s.cluster_ip.as_str(),
            s.external_ips.join(", "),
            format_ports(&s.ports),
            format_labels(&s.labels),
            s.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::Services, &headers, rows)
}

pub fn write_network_policies<W: WorkbookSink>(
    report: &mut Report<W>,
    policies: &[NetworkPolicyInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Pod Selector", "Policy Types", "Created At", "Labels"];
    let rows = policies.iter().map(|p| {
        row![
            p.name.as_str(),
            p.namespace.as_str(),
            p.pod_selector.as_str(),
            p.policy_types.join(", "),
            p.created_at.as_str(),
            format_labels(&p.labels),
        ]
    });
    write_table(report, Sheet::NetworkPolicies, &headers, rows)
}

pub fn write_ingresses<W: WorkbookSink>(
    report: &mut Report<W>,
    ingresses: &[IngressInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Rules", "TLS Hosts", "Labels", "Created At"];
    let rows = ingresses.iter().map(|i| {
        row![
            i.name.as_str(),
            i.namespace.as_str(),
            format_ingress_rules(&i.rules),
            i.tls.join(", "),
            format_labels(&i.labels),
            i.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::Ingresses, &headers, rows)
}

pub fn write_secrets<W: WorkbookSink>(
    report: &mut Report<W>,
    secrets: &[SecretInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Type", "Labels", "Created At"];
    let rows = secrets.iter().map(|s| {
        row![
            s.name.as_str(),
            s.namespace.as_str(),
            s.secret_type.as_str(),
            format_labels(&s.labels),
            s.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::Secrets, &headers, rows)
}

pub fn write_service_accounts<W: WorkbookSink>(
    report: &mut Report<W>,
    accounts: &[ServiceAccountInfo],
) -> Result<(), ReportError> {
    let headers = [
        "Name",
        "Namespace",
        "Secrets",
        "Image Pull Secrets",
        "Created At",
        "Labels",
    ];
    let rows = accounts.iter().map(|sa| {
        row![
            sa.name.as_str(),
            sa.namespace.as_str(),
            sa.secrets.join(", "),
            sa.image_pull_secrets.join(", "),
            sa.created_at.as_str(),
            format_labels(&sa.labels),
        ]
    });
    write_table(report, Sheet::ServiceAccounts, &headers, rows)
}

pub fn write_roles<W: WorkbookSink>(
    report: &mut Report<W>,
    roles: &[RoleInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Created At", "Rules"];
    let rows = roles.iter().map(|r| {
        row![
            r.name.as_str(),
            r.namespace.as_str(),
            r.created_at.as_str(),
            format_rules(&r.rules),
        ]
    });
    write_table(report, Sheet::Roles, &headers, rows)
}

pub fn write_role_bindings<W: WorkbookSink>(
    report: &mut Report<W>,
    bindings: &[BindingInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Namespace", "Role Ref", "Subjects", "Created At"];
    let rows = bindings.iter().map(|b| {
        row![
            b.name.as_str(),
            b.namespace.as_str(),
            b.role_ref.as_str(),
            format_subjects(&b.subjects),
            b.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::RoleBindings, &headers, rows)
}

pub fn write_cluster_roles<W: WorkbookSink>(
    report: &mut Report<W>,
    roles: &[RoleInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Created At", "Rules"];
    let rows = roles.iter().map(|r| {
        row![r.name.as_str(), r.created_at.as_str(), format_rules(&r.rules)]
    });
    write_table(report, Sheet::ClusterRoles, &headers, rows)
}

pub fn write_cluster_role_bindings<W: WorkbookSink>(
    report: &mut Report<W>,
    bindings: &[BindingInfo],
) -> Result<(), ReportError> {
    let headers = ["Name", "Role Ref", "Subjects", "Created At"];
    let rows = bindings.iter().map(|b| {
        row![
            b.name.as_str(),
            b.role_ref.as_str(),
            format_subjects(&b.subjects),
            b.created_at.as_str(),
        ]
    });
    write_table(report, Sheet::ClusterRoleBindings, &headers, rows)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::render;
    use crate::models::{
        AssessmentData, ContainerInfo, ContainerSecurityInfo, PodInfo, RoleInfo, ServicePort,
        ServiceInfo,
    };
    use crate::report::workbook::{CellValue, Style};

    fn privileged_pod() -> PodInfo {
        PodInfo {
            name: "agent".into(),
            namespace: "kube-system".into(),
            containers: vec![ContainerInfo {
                name: "main".into(),
                image: "agent:1".into(),
                env_vars: vec!["LOG_LEVEL".into(), "DB_PASSWORD".into()],
                security_context: ContainerSecurityInfo {
                    privileged: true,
                    capabilities: vec!["+NET_ADMIN".into(), "-SETUID".into()],
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_headers_and_autofilter() {
        let sink = render(&AssessmentData::default());
        assert_eq!(sink.text("Secrets", "A1").as_deref(), Some("Name"));
        assert_eq!(sink.style("Secrets", "A1"), Some(Style::Header));
        let filter = sink
            .filters
            .iter()
            .find(|(sheet, _)| sheet == "Secrets")
            .map(|(_, range)| range.to_string());
        assert_eq!(filter.as_deref(), Some("A1:E1"));
    }

    #[test]
    fn test_pod_row_contents() {
        let mut data = AssessmentData::default();
        data.workloads.pods = vec![privileged_pod()];
        let sink = render(&data);

        assert_eq!(sink.value("Pods", "E2"), Some(&CellValue::Bool(true)));
        assert_eq!(sink.style("Pods", "E2"), Some(Style::Critical));
        // Row 2 is even, so ordinary cells are shaded.
        assert_eq!(sink.style("Pods", "A2"), Some(Style::AltRow));
        assert_eq!(sink.value("Pods", "K2"), Some(&CellValue::Bool(true)));
        assert_eq!(sink.text("Pods", "N2").as_deref(), Some("+NET_ADMIN, -SETUID"));
        assert_eq!(sink.text("Pods", "Q2").as_deref(), Some("LOG_LEVEL"));
    }

    #[test]
    fn test_unprivileged_cell_keeps_row_style() {
        let mut data = AssessmentData::default();
        let mut pod = privileged_pod();
        pod.containers[0].security_context.privileged = false;
        data.workloads.pods = vec![pod.clone(), pod];
        let sink = render(&data);

        assert_eq!(sink.style("Pods", "E2"), Some(Style::AltRow));
        assert_eq!(sink.style("Pods", "E3"), Some(Style::Content));
    }

    #[test]
    fn test_service_ports_cell() {
        let mut data = AssessmentData::default();
        data.network.services = vec![ServiceInfo {
            name: "web".into(),
            ports: vec![ServicePort { port: 80, target_port: 8080, protocol: "TCP".into() }],
            ..Default::default()
        }];
        let sink = render(&data);
        assert_eq!(sink.text("Services", "F2").as_deref(), Some("80→8080/TCP"));
    }

    #[test]
    fn test_cluster_roles_have_no_namespace_column() {
        let mut data = AssessmentData::default();
        data.rbac.cluster_roles = vec![RoleInfo {
            name: "view".into(),
            cluster_role: true,
            ..Default::default()
        }];
        let sink = render(&data);
        assert_eq!(sink.text("Cluster Roles", "B1").as_deref(), Some("Created At"));
        assert_eq!(sink.text("Cluster Roles", "A2").as_deref(), Some("view"));
    }
}
