//! Workbook synthesis.
//!
//! A [`Report`] moves through four steps over a single workbook:
//!
//! 1. **Create**: the workbook is instantiated with its first sheet,
//!    "Contents".
//! 2. **Populate**: every sheet is added and filled in [`Sheet::ALL`] order.
//! 3. **Layout**: each sheet's columns are sized to their widest value.
//! 4. **Commit**: the workbook is saved to the caller's path.
//!
//! Any failure before commit is fatal; nothing is written to disk. The logo
//! on the Contents sheet is the one best-effort element.

pub mod contents;
pub mod dashboard;
pub mod format;
pub mod layout;
pub mod sheets;
pub mod styles;
pub mod workbook;

use crate::models::AssessmentData;
use layout::ColumnWidths;
use std::fmt;
use std::path::{Path, PathBuf};
use workbook::{CellRange, CellRef, CellValue, ColumnChart, Style, WorkbookSink, XlsxWorkbook};

pub const DEFAULT_TITLE: &str = "Kubernetes Reconnaissance Report";

/// Error type for workbook synthesis.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sheets of the report, in workbook order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Contents,
    Dashboard,
    Nodes,
    Namespaces,
    Pods,
    Deployments,
    StatefulSets,
    DaemonSets,
    Services,
    NetworkPolicies,
    Ingresses,
    Secrets,
    ServiceAccounts,
    Roles,
    RoleBindings,
    ClusterRoles,
    ClusterRoleBindings,
}

impl Sheet {
    pub const ALL: [Sheet; 17] = [
        Sheet::Contents,
        Sheet::Dashboard,
        Sheet::Nodes,
        Sheet::Namespaces,
        Sheet::Pods,
        Sheet::Deployments,
        Sheet::StatefulSets,
        Sheet::DaemonSets,
        Sheet::Services,
        Sheet::NetworkPolicies,
        Sheet::Ingresses,
        Sheet::Secrets,
        Sheet::ServiceAccounts,
        Sheet::Roles,
        Sheet::RoleBindings,
        Sheet::ClusterRoles,
        Sheet::ClusterRoleBindings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sheet::Contents => "Contents",
            Sheet::Dashboard => "Dashboard",
            Sheet::Nodes => "Nodes",
            Sheet::Namespaces => "Namespaces",
            Sheet::Pods => "Pods",
            Sheet::Deployments => "Deployments",
            Sheet::StatefulSets => "StatefulSets",
            Sheet::DaemonSets => "DaemonSets",
            Sheet::Services => "Services",
            Sheet::NetworkPolicies => "Network Policies",
            Sheet::Ingresses => "Ingresses",
            Sheet::Secrets => "Secrets",
            Sheet::ServiceAccounts => "Service Accounts",
            Sheet::Roles => "Roles",
            Sheet::RoleBindings => "Role Bindings",
            Sheet::ClusterRoles => "Cluster Roles",
            Sheet::ClusterRoleBindings => "Cluster Role Bindings",
        }
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-supplied presentation settings.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub logo: Option<PathBuf>,
    /// Shown on the Contents sheet
    pub generated_at: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            logo: None,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One report over one workbook sink.
pub struct Report<W: WorkbookSink> {
    sink: W,
    widths: ColumnWidths,
    options: ReportOptions,
    populated: Vec<Sheet>,
}

impl<W: WorkbookSink> Report<W> {
    /// Create step: seed the workbook with the Contents sheet.
    pub fn create(mut sink: W, options: ReportOptions) -> Result<Self, ReportError> {
        sink.add_sheet(Sheet::Contents.name())?;
        Ok(Self {
            sink,
            widths: ColumnWidths::new(),
            options,
            populated: Vec::new(),
        })
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Populate step: add and fill every sheet in order.
    pub fn populate(&mut self, data: &AssessmentData) -> Result<(), ReportError> {
        for sheet in Sheet::ALL {
            if sheet != Sheet::Contents {
                self.sink.add_sheet(sheet.name())?;
            }

            match sheet {
                Sheet::Contents => contents::write_contents(self, &data.cluster_info.api_server)?,
                Sheet::Dashboard => dashboard::write_dashboard(self, data)?,
                Sheet::Nodes => sheets::write_nodes(self, &data.cluster_info.nodes)?,
                Sheet::Namespaces => sheets::write_namespaces(self, &data.cluster_info.namespaces)?,
                Sheet::Pods => sheets::write_pods(self, &data.workloads.pods)?,
                Sheet::Deployments => sheets::write_deployments(self, &data.workloads.deployments)?,
                Sheet::StatefulSets => {
                    sheets::write_stateful_sets(self, &data.workloads.stateful_sets)?
                }
                Sheet::DaemonSets => sheets::write_daemon_sets(self, &data.workloads.daemon_sets)?,
                Sheet::Services => sheets::write_services(self, &data.network.services)?,
                Sheet::NetworkPolicies => {
                    sheets::write_network_policies(self, &data.network.network_policies)?
                }
                Sheet::Ingresses => sheets::write_ingresses(self, &data.network.ingresses)?,
                Sheet::Secrets => sheets::write_secrets(self, &data.secrets.secrets)?,
                Sheet::ServiceAccounts => {
                    sheets::write_service_accounts(self, &data.rbac.service_accounts)?
                }
                Sheet::Roles => sheets::write_roles(self, &data.rbac.roles)?,
                Sheet::RoleBindings => sheets::write_role_bindings(self, &data.rbac.role_bindings)?,
                Sheet::ClusterRoles => sheets::write_cluster_roles(self, &data.rbac.cluster_roles)?,
                Sheet::ClusterRoleBindings => {
                    sheets::write_cluster_role_bindings(self, &data.rbac.cluster_role_bindings)?
                }
            }

            log::debug!("Populated sheet '{}'", sheet);
            self.populated.push(sheet);
        }
        Ok(())
    }

    /// Layout step: auto-fit the columns of every populated sheet.
    pub fn layout(&mut self) -> Result<(), ReportError> {
        for sheet in &self.populated {
            for (col, width) in self.widths.fitted(sheet.name()) {
                self.sink.set_column_width(sheet.name(), col, width)?;
            }
        }
        Ok(())
    }

    /// Commit step: save the workbook and hand back the sink.
    pub fn commit(mut self, path: &Path) -> Result<W, ReportError> {
        self.sink.save(path)?;
        log::info!("Report saved to {}", path.display());
        Ok(self.sink)
    }

    // ------------------------------------------------------------------------
    // Writing primitives used by the sheet builders
    // ------------------------------------------------------------------------

    pub(crate) fn write(
        &mut self,
        sheet: Sheet,
        at: CellRef,
        value: impl Into<CellValue>,
        style: Style,
    ) -> Result<(), ReportError> {
        let (value, truncated) = value.into().fit_to_cell();
        if truncated {
            log::warn!(
                "Cell {}!{} exceeds {} characters and was truncated",
                sheet,
                at,
                workbook::MAX_CELL_CHARS
            );
        }
        self.widths
            .observe(sheet.name(), at.col, value.display_width());
        self.sink.write(sheet.name(), at, &value, style)
    }

    /// Merged cells do not take part in auto-fit.
    pub(crate) fn merge(
        &mut self,
        sheet: Sheet,
        range: CellRange,
        text: &str,
        style: Style,
    ) -> Result<(), ReportError> {
        self.sink.merge(sheet.name(), range, text, style)
    }

    pub(crate) fn link(
        &mut self,
        sheet: Sheet,
        at: CellRef,
        target: Sheet,
        style: Style,
    ) -> Result<(), ReportError> {
        self.widths
            .observe(sheet.name(), at.col, target.name().chars().count());
        self.sink
            .link(sheet.name(), at, target.name(), target.name(), style)
    }

    pub(crate) fn autofilter(&mut self, sheet: Sheet, range: CellRange) -> Result<(), ReportError> {
        self.sink.autofilter(sheet.name(), range)
    }

    pub(crate) fn image(
        &mut self,
        sheet: Sheet,
        at: CellRef,
        path: &Path,
        scale: (f64, f64),
    ) -> Result<(), ReportError> {
        self.sink.insert_image(sheet.name(), at, path, scale)
    }

    pub(crate) fn chart(&mut self, sheet: Sheet, chart: &ColumnChart) -> Result<(), ReportError> {
        self.sink.insert_chart(sheet.name(), chart)
    }
}

/// Build the full report for `data` and save it to `path`.
pub fn generate(
    data: &AssessmentData,
    path: &Path,
    options: ReportOptions,
) -> Result<(), ReportError> {
    let mut report = Report::create(XlsxWorkbook::new(), options)?;
    report.populate(data)?;
    report.layout()?;
    report.commit(path)?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::render;
    use super::*;
    use crate::models::{PolicyRule, RoleInfo};

    #[test]
    fn test_sheet_order() {
        let sink = render(&AssessmentData::default());
        let names: Vec<&str> = Sheet::ALL.iter().map(Sheet::name).collect();
        assert_eq!(sink.sheets, names);
        assert_eq!(sink.sheets.len(), 17);
        assert_eq!(sink.sheets[0], "Contents");
        assert_eq!(sink.sheets[16], "Cluster Role Bindings");
    }

    #[test]
    fn test_commit_saves_to_path() {
        let sink = render(&AssessmentData::default());
        assert_eq!(sink.saved_to.as_deref(), Some(Path::new("memory.xlsx")));
    }

    #[test]
    fn test_layout_fits_every_written_column() {
        let sink = render(&AssessmentData::default());
        // Header "Container Runtime" is the widest value in Nodes column E.
        assert_eq!(sink.width("Nodes", 5), Some(19.0));
        // Short headers clamp to the minimum.
        assert_eq!(sink.width("Nodes", 6), Some(10.0));
    }

    fn huge_cluster_role() -> AssessmentData {
        let mut data = AssessmentData::default();
        data.rbac.cluster_roles = vec![RoleInfo {
            name: "aggregate-to-admin".to_string(),
            cluster_role: true,
            rules: vec![PolicyRule {
                api_groups: vec!["*".to_string()],
                resources: (0..3000)
                    .map(|i| format!("widgets{}.example.com", i))
                    .collect(),
                verbs: vec!["get".to_string(), "list".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }];
        data
    }

    #[test]
    fn test_oversized_cell_is_truncated() {
        let sink = render(&huge_cluster_role());
        let rules = sink.text("Cluster Roles", "C2").unwrap();
        assert_eq!(rules.chars().count(), workbook::MAX_CELL_CHARS);
        assert!(rules.ends_with(workbook::TRUNCATION_MARKER));
        assert!(rules.starts_with("API Groups: [*]"));
        assert_eq!(sink.width("Cluster Roles", 3), Some(layout::MAX_COLUMN_WIDTH));
    }

    #[test]
    fn test_generate_with_oversized_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.xlsx");
        generate(&huge_cluster_role(), &path, test_support::options()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        generate(&AssessmentData::default(), &path, test_support::options()).unwrap();
        assert!(path.exists());
    }
}
