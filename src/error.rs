use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading data or building the search index.
///
/// Scoring itself never fails: missing terms and zero norms are folded
/// into zero scores, so none of these variants surface per query.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("failed to read dataset {path}: {source}")]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset: {0}")]
    DatasetParse(#[from] serde_json::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("latent factorization did not converge ({rows}x{cols} matrix)")]
    Factorization { rows: usize, cols: usize },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
