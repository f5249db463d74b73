use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("required column '{0}' not found in table header")]
    MissingColumn(String),

    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("condition '{code}' on data row {row} has no region mapping")]
    UnmappedCondition { code: String, row: usize },

    #[error("fraction {value} for {name} must be strictly between 0 and 1")]
    InvalidFraction { name: &'static str, value: f64 },

    #[error("test fraction {test} plus val fraction {val} must stay below 1")]
    FractionsTooLarge { test: f64, val: f64 },

    #[error("cannot stratify region '{region}' ({rows} rows): {reason}")]
    StratificationInfeasible {
        region: String,
        rows: usize,
        reason: String,
    },

    #[error("failed to write report: {0}")]
    Report(#[from] serde_json::Error),
}
