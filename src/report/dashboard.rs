//! Dashboard sheet: key metrics plus two summary tables with charts.

use super::workbook::{CellRange, CellRef, CellValue, ColumnChart, Style, WorkbookSink};
use super::{Report, ReportError, Sheet};
use crate::models::{AssessmentData, KeyMetrics, MetricValue, PodSecuritySummary, RbacSummary};

pub const DASHBOARD_TITLE: &str = "Kubernetes Cluster Configuration Overview";

const METRICS_FIRST_ROW: u32 = 4;

/// A two-column "Type / Count" table under a merged section label.
///
/// `origin` is the section label cell; the header sits one row below it and
/// data rows follow the header. Chart ranges are derived from the same
/// origin so they always cover exactly the written rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryTable {
    pub origin: CellRef,
    pub rows: u32,
}

impl SummaryTable {
    pub const fn new(origin: CellRef, rows: u32) -> Self {
        Self { origin, rows }
    }

    pub fn section_range(&self) -> CellRange {
        CellRange::row(self.origin.row, self.origin.col, self.origin.col + 1)
    }

    pub fn header_row(&self) -> u32 {
        self.origin.row + 1
    }

    pub fn first_data_row(&self) -> u32 {
        self.origin.row + 2
    }

    pub fn last_data_row(&self) -> u32 {
        self.first_data_row() + self.rows - 1
    }

    /// Label cells of the data rows.
    pub fn category_range(&self) -> CellRange {
        CellRange::column(self.origin.col, self.first_data_row(), self.last_data_row())
    }

    /// Count cells of the data rows.
    pub fn value_range(&self) -> CellRange {
        CellRange::column(self.origin.col + 1, self.first_data_row(), self.last_data_row())
    }

    fn chart(&self, title: &str, series_name: &str, anchor: CellRef) -> ColumnChart {
        ColumnChart {
            title: title.to_string(),
            series_name: series_name.to_string(),
            data_sheet: Sheet::Dashboard.name().to_string(),
            categories: self.category_range(),
            values: self.value_range(),
            anchor,
        }
    }
}

/// RBAC table: section E3:F3, data rows 5-9.
pub const RBAC_TABLE: SummaryTable = SummaryTable::new(CellRef::new(3, 5), 5);
/// Pod table: section E12:F12, data rows 14-19.
pub const POD_TABLE: SummaryTable = SummaryTable::new(CellRef::new(12, 5), 6);

/// Style of a pod-security count cell.
pub fn pod_count_style(label: &str, count: usize, row_style: Style) -> Style {
    if label == "Total Pods" {
        return row_style;
    }
    if count == 0 {
        return Style::Good;
    }
    match label {
        "Privileged" | "Host PID" => Style::Critical,
        "Host Network" | "RunAsRoot" => Style::Warning,
        "Host IPC" => Style::Moderate,
        _ => row_style,
    }
}

fn write_summary_table<W: WorkbookSink>(
    report: &mut Report<W>,
    table: SummaryTable,
    section: &str,
    rows: &[(&'static str, usize)],
    count_style: impl Fn(&str, usize, Style) -> Style,
) -> Result<(), ReportError> {
    let sheet = Sheet::Dashboard;
    let (label_col, value_col) = (table.origin.col, table.origin.col + 1);

    report.merge(sheet, table.section_range(), section, Style::Section)?;
    report.write(sheet, CellRef::new(table.header_row(), label_col), "Type", Style::Header)?;
    report.write(sheet, CellRef::new(table.header_row(), value_col), "Count", Style::Header)?;

    for (i, &(label, count)) in rows.iter().enumerate() {
        let row = table.first_data_row() + i as u32;
        let style = Style::for_index(i);
        report.write(sheet, CellRef::new(row, label_col), label, style)?;
        report.write(
            sheet,
            CellRef::new(row, value_col),
            count,
            count_style(label, count, style),
        )?;
    }
    Ok(())
}

pub fn write_dashboard<W: WorkbookSink>(
    report: &mut Report<W>,
    data: &AssessmentData,
) -> Result<(), ReportError> {
    let sheet = Sheet::Dashboard;

    report.merge(sheet, CellRange::row(1, 1, 3), DASHBOARD_TITLE, Style::Title)?;
    report.merge(sheet, CellRange::row(3, 1, 3), "Cluster Overview", Style::Section)?;

    for (i, metric) in KeyMetrics::from_assessment(data).iter().enumerate() {
        let row = METRICS_FIRST_ROW + i as u32;
        let style = Style::for_index(i);
        let value = match &metric.value {
            MetricValue::Text(text) => CellValue::from(text.as_str()),
            MetricValue::Count(n) => CellValue::from(*n),
        };
        report.write(sheet, CellRef::new(row, 1), metric.label, style)?;
        report.write(sheet, CellRef::new(row, 2), value, style)?;
    }

    let rbac = RbacSummary::from_rbac(&data.rbac);
    write_summary_table(
        report,
        RBAC_TABLE,
        "RBAC Summary",
        &rbac.rows(),
        |_, _, style| style,
    )?;
    let rbac_chart = RBAC_TABLE.chart(
        "RBAC Objects Distribution",
        "RBAC Objects",
        CellRef::new(RBAC_TABLE.header_row(), 8),
    );
    report.chart(sheet, &rbac_chart)?;

    let pods = PodSecuritySummary::from_workloads(&data.workloads);
    write_summary_table(
        report,
        POD_TABLE,
        "Pod Security Summary",
        &pods.rows(),
        pod_count_style,
    )?;
    // Chart sits one blank row below the table.
    let pod_chart = POD_TABLE.chart(
        "Pod Configurations",
        "Pod Security",
        CellRef::new(POD_TABLE.last_data_row() + 2, POD_TABLE.origin.col),
    );
    report.chart(sheet, &pod_chart)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerInfo, ContainerSecurityInfo, PodInfo, PodSecurityInfo};
    use crate::report::test_support::render;

    #[test]
    fn test_table_geometry() {
        assert_eq!(RBAC_TABLE.section_range().to_string(), "E3:F3");
        assert_eq!(RBAC_TABLE.header_row(), 4);
        assert_eq!(RBAC_TABLE.category_range().to_string(), "E5:E9");
        assert_eq!(RBAC_TABLE.value_range().to_string(), "F5:F9");

        assert_eq!(POD_TABLE.section_range().to_string(), "E12:F12");
        assert_eq!(POD_TABLE.header_row(), 13);
        assert_eq!(POD_TABLE.category_range().to_string(), "E14:E19");
        assert_eq!(POD_TABLE.value_range().to_string(), "F14:F19");
    }

    #[test]
    fn test_pod_count_styles() {
        assert_eq!(pod_count_style("Privileged", 0, Style::Content), Style::Good);
        assert_eq!(pod_count_style("Privileged", 2, Style::Content), Style::Critical);
        assert_eq!(pod_count_style("Host PID", 1, Style::Content), Style::Critical);
        assert_eq!(pod_count_style("Host Network", 1, Style::Content), Style::Warning);
        assert_eq!(pod_count_style("RunAsRoot", 3, Style::AltRow), Style::Warning);
        assert_eq!(pod_count_style("Host IPC", 1, Style::Content), Style::Moderate);
        assert_eq!(pod_count_style("Total Pods", 0, Style::AltRow), Style::AltRow);
    }

    #[test]
    fn test_dashboard_layout() {
        let mut data = AssessmentData::default();
        data.cluster_info.version = "v1.29.4".into();
        data.workloads.pods = vec![PodInfo {
            containers: vec![ContainerInfo {
                security_context: ContainerSecurityInfo {
                    privileged: true,
                    ..Default::default()
                },
                ..Default::default()
            }],
            security_context: PodSecurityInfo {
                host_network: true,
                ..Default::default()
            },
            ..Default::default()
        }];

        let sink = render(&data);

        let merged: Vec<String> = sink
            .merges
            .iter()
            .filter(|(s, ..)| s == "Dashboard")
            .map(|(_, range, text, _)| format!("{} {}", range, text))
            .collect();
        assert!(merged.contains(&format!("A1:C1 {}", DASHBOARD_TITLE)));
        assert!(merged.contains(&"A3:C3 Cluster Overview".to_string()));
        assert!(merged.contains(&"E3:F3 RBAC Summary".to_string()));
        assert!(merged.contains(&"E12:F12 Pod Security Summary".to_string()));

        assert_eq!(sink.text("Dashboard", "A4").as_deref(), Some("Kubernetes Version"));
        assert_eq!(sink.text("Dashboard", "B4").as_deref(), Some("v1.29.4"));
        assert_eq!(sink.text("Dashboard", "A19").as_deref(), Some("Total ServiceAccounts"));
        assert_eq!(sink.text("Dashboard", "E4").as_deref(), Some("Type"));
        assert_eq!(sink.text("Dashboard", "E5").as_deref(), Some("Roles"));
        assert_eq!(sink.text("Dashboard", "E15").as_deref(), Some("Privileged"));
        assert_eq!(sink.value("Dashboard", "F15"), Some(&CellValue::Number(1.0)));
        assert_eq!(sink.style("Dashboard", "F15"), Some(Style::Critical));
        assert_eq!(sink.style("Dashboard", "F16"), Some(Style::Warning));
        assert_eq!(sink.style("Dashboard", "F17"), Some(Style::Good));
    }

    #[test]
    fn test_dashboard_first_entry_of_each_table_is_plain() {
        let sink = render(&AssessmentData::default());

        assert_eq!(sink.style("Dashboard", "A4"), Some(Style::Content));
        assert_eq!(sink.style("Dashboard", "B4"), Some(Style::Content));
        assert_eq!(sink.style("Dashboard", "A5"), Some(Style::AltRow));
        assert_eq!(sink.style("Dashboard", "E5"), Some(Style::Content));
        assert_eq!(sink.style("Dashboard", "E6"), Some(Style::AltRow));
        assert_eq!(sink.style("Dashboard", "E14"), Some(Style::Content));
        assert_eq!(sink.style("Dashboard", "F14"), Some(Style::Content));
        assert_eq!(sink.style("Dashboard", "E15"), Some(Style::AltRow));
    }

    #[test]
    fn test_dashboard_charts() {
        let sink = render(&AssessmentData::default());
        assert_eq!(sink.charts.len(), 2);

        let (sheet, rbac) = &sink.charts[0];
        assert_eq!(sheet, "Dashboard");
        assert_eq!(rbac.title, "RBAC Objects Distribution");
        assert_eq!(rbac.series_name, "RBAC Objects");
        assert_eq!(rbac.anchor.to_string(), "H4");
        assert_eq!(rbac.categories.absolute_in(&rbac.data_sheet), "'Dashboard'!$E$5:$E$9");

        let (_, pods) = &sink.charts[1];
        assert_eq!(pods.title, "Pod Configurations");
        assert_eq!(pods.series_name, "Pod Security");
        assert_eq!(pods.anchor.to_string(), "E21");
        assert_eq!(pods.values.absolute_in(&pods.data_sheet), "'Dashboard'!$F$14:$F$19");
    }
}
