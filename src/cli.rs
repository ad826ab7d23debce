use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kube-radar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Snapshot a Kubernetes cluster's security posture")]
#[command(long_about = "Reads RBAC, workload, network and secret configuration from a Kubernetes cluster through its API server and writes a multi-sheet Excel report with a contents page and a dashboard.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect cluster state and write the Excel report
    Report {
        /// Output workbook path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        cluster: ClusterArgs,

        /// Number of namespaces queried at the same time
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: Option<u16>,

        /// Fail instead of writing a report when any listing was omitted
        #[arg(long)]
        strict: bool,

        /// Image placed at the top of the contents sheet
        #[arg(long, value_name = "FILE")]
        logo: Option<PathBuf>,
    },

    /// Collect cluster state and print key metrics
    Summary {
        #[command(flatten)]
        cluster: ClusterArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List the contexts of a kubeconfig
    Contexts {
        /// Kubeconfig file (defaults to KUBECONFIG or ~/.kube/config)
        #[arg(long, value_name = "FILE")]
        kubeconfig: Option<PathBuf>,
    },
}

/// Cluster selection shared by the collecting commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ClusterArgs {
    /// Kubeconfig file (defaults to KUBECONFIG or ~/.kube/config)
    #[arg(long, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, value_name = "NAME")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
