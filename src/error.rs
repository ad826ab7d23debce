use crate::collector::{CollectError, CollectionWarning, ConnectError};
use crate::report::ReportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("Collection failed: {0}")]
    Collect(#[from] CollectError),

    #[error("Cluster connection failed: {0}")]
    Connect(#[from] ConnectError),

    #[error("Report generation failed: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Collection incomplete: {} listing(s) omitted (first: {})", .warnings.len(), first_warning(.warnings))]
    PartialCollection { warnings: Vec<CollectionWarning> },
}

fn first_warning(warnings: &[CollectionWarning]) -> String {
    warnings
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, RadarError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ResourceKind;

    #[test]
    fn test_partial_collection_message() {
        let err = RadarError::PartialCollection {
            warnings: vec![CollectionWarning {
                kind: ResourceKind::Pods,
                namespace: "team-b".to_string(),
                message: "forbidden".to_string(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "Collection incomplete: 1 listing(s) omitted (first: pods in namespace 'team-b' omitted: forbidden)"
        );
    }
}
