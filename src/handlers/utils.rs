use crate::cli::ClusterArgs;
use crate::collector::{ClusterApi, Collection, Collector, KubeClusterApi};
use crate::config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Kubeconfig and context after applying CLI overrides to the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterTarget {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl ClusterTarget {
    pub fn resolve(config: &Config, args: &ClusterArgs) -> Self {
        Self {
            kubeconfig: args
                .kubeconfig
                .clone()
                .or_else(|| config.cluster.kubeconfig.clone()),
            context: args.context.clone().or_else(|| config.cluster.context.clone()),
        }
    }

    pub async fn connect(&self) -> crate::Result<KubeClusterApi> {
        let api =
            KubeClusterApi::connect(self.kubeconfig.as_deref(), self.context.as_deref()).await?;
        Ok(api)
    }
}

/// Spinner shown while collecting, unless output is suppressed.
pub fn collection_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Some(spinner)
}

/// Run a full collection with a spinner naming the API server.
pub async fn collect_with_progress<C: ClusterApi>(
    collector: &Collector<C>,
    quiet: bool,
) -> crate::Result<Collection> {
    let spinner = collection_spinner(quiet);
    if let Some(spinner) = &spinner {
        spinner.set_message(format!("Collecting from {}...", collector.api().api_server()));
    }

    let result = collector.collect_all().await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    Ok(result?)
}
