use std::path::PathBuf;

use thiserror::Error;

/// Run-wide failures. Per-record and per-chunk problems never surface here;
/// they are absorbed into `ProcessingStats`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input validation failed: {errors} invalid records (limit {limit})")]
    Validation { errors: usize, limit: usize },

    #[error("input must be a JSON array of records, got {found}")]
    NotAnArray { found: &'static str },

    #[error("all {chunks} chunks failed; nothing was processed")]
    AllChunksFailed { chunks: usize },

    #[error("chunk worker failed: {0}")]
    Worker(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    #[error("failed to read settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single record that could not be turned into a candidate.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("record {index}: processing panicked: {message}")]
    Panicked { index: usize, message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
