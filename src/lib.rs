//! # kube-radar
//!
//! Takes a read-only snapshot of a Kubernetes cluster's security-relevant
//! configuration and renders it as a multi-sheet Excel workbook.
//!
//! ## Features
//!
//! - **Collection**: nodes, namespaces, RBAC, workloads, network objects and
//!   secret metadata, listed through the API server
//! - **Partial results**: a forbidden namespace listing becomes a warning
//!   instead of aborting the run
//! - **Report**: contents page, dashboard with charts and one filterable
//!   table per resource kind
//!
//! ## Example
//!
//! ```rust,no_run
//! use kube_radar::collector::{Collector, KubeClusterApi};
//! use kube_radar::report::{self, ReportOptions};
//! use std::path::Path;
//!
//! # async fn run() -> kube_radar::Result<()> {
//! let api = KubeClusterApi::connect(None, None).await?;
//! let collection = Collector::new(api).collect_all().await?;
//! report::generate(&collection.data, Path::new("report.xlsx"), ReportOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod report;

pub use collector::{Collection, Collector};
pub use error::{RadarError, Result};
pub use models::AssessmentData;
use cli::{Cli, Commands};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run_command(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Report {
            output,
            cluster,
            concurrency,
            strict,
            logo,
        } => {
            handlers::handle_report(&config, output, cluster, concurrency, strict, logo, cli.quiet)
                .await
        }
        Commands::Summary { cluster, format } => {
            handlers::handle_summary(&config, cluster, format, cli.quiet).await
        }
        Commands::Contexts { kubeconfig } => {
            handlers::handle_contexts(kubeconfig.or(config.cluster.kubeconfig))
        }
    }
}
