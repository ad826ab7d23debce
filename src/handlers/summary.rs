use super::utils::{ClusterTarget, collect_with_progress};
use crate::{
    cli::{ClusterArgs, OutputFormat},
    collector::{Collection, CollectionWarning, Collector},
    config::Config,
    models::{KeyMetrics, PodSecuritySummary, RbacSummary},
    report::{dashboard::pod_count_style, workbook::Style},
};
use colored::*;
use prettytable::{Cell, Row, Table, format};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SummaryView<'a> {
    api_server: &'a str,
    key_metrics: KeyMetrics,
    rbac: RbacSummary,
    pod_security: PodSecuritySummary,
    warnings: &'a [CollectionWarning],
}

/// Render key metrics, posture totals and warnings for the terminal.
pub fn render_summary(collection: &Collection, format: OutputFormat) -> crate::Result<String> {
    let data = &collection.data;
    let view = SummaryView {
        api_server: &data.cluster_info.api_server,
        key_metrics: KeyMetrics::from_assessment(data),
        rbac: RbacSummary::from_rbac(&data.rbac),
        pod_security: PodSecuritySummary::from_workloads(&data.workloads),
        warnings: &collection.warnings,
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&view)?),
        OutputFormat::Table => Ok(render_tables(&view)),
    }
}

fn render_tables(view: &SummaryView<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Cluster Overview".bold()));
    let mut metrics = two_column_table("Metric", "Value");
    for metric in view.key_metrics.iter() {
        metrics.add_row(Row::new(vec![
            Cell::new(metric.label),
            Cell::new(&metric.value.to_string()),
        ]));
    }
    out.push_str(&metrics.to_string());

    out.push_str(&format!("\n{}\n", "RBAC Summary".bold()));
    let mut rbac = two_column_table("Type", "Count");
    for (label, count) in view.rbac.rows() {
        rbac.add_row(Row::new(vec![Cell::new(label), Cell::new(&count.to_string())]));
    }
    out.push_str(&rbac.to_string());

    out.push_str(&format!("\n{}\n", "Pod Security Summary".bold()));
    let mut pods = two_column_table("Type", "Count");
    for (label, count) in view.pod_security.rows() {
        let cell = Cell::new(&count.to_string());
        let cell = match pod_count_style(label, count, Style::Content) {
            Style::Critical => cell.style_spec("Fr"),
            Style::Warning | Style::Moderate => cell.style_spec("Fy"),
            Style::Good => cell.style_spec("Fg"),
            _ => cell,
        };
        pods.add_row(Row::new(vec![Cell::new(label), cell]));
    }
    out.push_str(&pods.to_string());

    if !view.warnings.is_empty() {
        out.push_str(&format!(
            "\n{} {} listing(s) omitted:\n",
            "⚠".yellow(),
            view.warnings.len()
        ));
        for warning in view.warnings {
            out.push_str(&format!("  {}\n", warning.to_string().yellow()));
        }
    }

    out
}

fn two_column_table(left: &str, right: &str) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![
        Cell::new(left).style_spec("b"),
        Cell::new(right).style_spec("b"),
    ]));
    table
}

pub async fn handle_summary(
    config: &Config,
    cluster: ClusterArgs,
    format: OutputFormat,
    quiet: bool,
) -> crate::Result<()> {
    let api = ClusterTarget::resolve(config, &cluster).connect().await?;
    let collector = Collector::new(api).with_concurrency(config.collection.concurrency);
    // JSON output stays machine-readable.
    let collection =
        collect_with_progress(&collector, quiet || format == OutputFormat::Json).await?;

    print!("{}", render_summary(&collection, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ResourceKind;
    use crate::models::{ContainerInfo, ContainerSecurityInfo, PodInfo};

    fn collection() -> Collection {
        let mut collection = Collection::default();
        collection.data.cluster_info.version = "v1.29.4".to_string();
        collection.data.cluster_info.api_server = "https://10.0.0.1:6443".to_string();
        collection.data.workloads.pods = vec![PodInfo {
            name: "api".to_string(),
            containers: vec![ContainerInfo {
                security_context: ContainerSecurityInfo {
                    privileged: true,
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        }];
        collection.warnings = vec![CollectionWarning {
            kind: ResourceKind::Secrets,
            namespace: "team-b".to_string(),
            message: "forbidden".to_string(),
        }];
        collection
    }

    #[test]
    fn test_json_summary() {
        let json = render_summary(&collection(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["api_server"], "https://10.0.0.1:6443");
        assert_eq!(value["pod_security"]["privileged"], 1);
        assert_eq!(value["warnings"][0]["kind"], "secrets");
        assert_eq!(value["warnings"][0]["namespace"], "team-b");
        assert_eq!(value["key_metrics"]["metrics"][0]["value"], "v1.29.4");
        assert_eq!(value["key_metrics"]["metrics"][3]["label"], "Total Pods");
        assert_eq!(value["key_metrics"]["metrics"][3]["value"], 1);
    }

    #[test]
    fn test_table_summary() {
        colored::control::set_override(false);
        let text = render_summary(&collection(), OutputFormat::Table).unwrap();

        assert!(text.contains("Cluster Overview"));
        assert!(text.contains("Kubernetes Version"));
        assert!(text.contains("v1.29.4"));
        assert!(text.contains("Pod Security Summary"));
        assert!(text.contains("1 listing(s) omitted"));
        assert!(text.contains("secrets in namespace 'team-b' omitted: forbidden"));
    }
}
