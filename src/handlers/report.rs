use super::utils::{ClusterTarget, collect_with_progress};
use crate::{
    cli::ClusterArgs,
    collector::{ClusterApi, Collector, CollectionWarning},
    config::Config,
    error::RadarError,
    report::{self, ReportOptions},
};
use colored::*;
use std::path::PathBuf;

/// Everything `report` needs once config and flags are merged.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub output: PathBuf,
    pub concurrency: usize,
    pub strict: bool,
    pub options: ReportOptions,
}

impl ReportSettings {
    pub fn resolve(
        config: &Config,
        output: Option<PathBuf>,
        concurrency: Option<u16>,
        strict: bool,
        logo: Option<PathBuf>,
    ) -> Self {
        Self {
            output: output.unwrap_or_else(|| config.report.output.clone()),
            concurrency: concurrency
                .map(usize::from)
                .unwrap_or(config.collection.concurrency),
            strict: strict || config.collection.strict,
            options: ReportOptions {
                title: config.report.title.clone(),
                logo: logo.or_else(|| config.report.logo.clone()),
                ..ReportOptions::default()
            },
        }
    }
}

/// Result of a successful `report` run.
#[derive(Debug)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub warnings: Vec<CollectionWarning>,
}

/// Collect from `api` and write the workbook.
///
/// In strict mode any omitted listing aborts the run before the workbook is
/// created.
pub async fn run_report<C: ClusterApi>(
    api: C,
    settings: &ReportSettings,
    quiet: bool,
) -> crate::Result<ReportOutcome> {
    let collector = Collector::new(api).with_concurrency(settings.concurrency);
    let collection = collect_with_progress(&collector, quiet).await?;

    if settings.strict && !collection.is_complete() {
        return Err(RadarError::PartialCollection {
            warnings: collection.warnings,
        });
    }

    report::generate(&collection.data, &settings.output, settings.options.clone())?;

    Ok(ReportOutcome {
        path: settings.output.clone(),
        warnings: collection.warnings,
    })
}

pub async fn handle_report(
    config: &Config,
    output: Option<PathBuf>,
    cluster: ClusterArgs,
    concurrency: Option<u16>,
    strict: bool,
    logo: Option<PathBuf>,
    quiet: bool,
) -> crate::Result<()> {
    let settings = ReportSettings::resolve(config, output, concurrency, strict, logo);
    let api = ClusterTarget::resolve(config, &cluster).connect().await?;

    if !quiet {
        println!("🔍 Scanning cluster at {}", api.api_server().cyan());
    }

    let outcome = run_report(api, &settings, quiet).await?;

    if !quiet {
        if !outcome.warnings.is_empty() {
            println!(
                "{} {} listing(s) omitted:",
                "⚠".yellow(),
                outcome.warnings.len()
            );
            for warning in &outcome.warnings {
                println!("  {}", warning.to_string().yellow());
            }
        }
        println!(
            "{} Report saved to: {}",
            "✅".green(),
            outcome.path.display().to_string().bold()
        );
    }

    Ok(())
}
