use std::path::PathBuf;
use thiserror::Error;

/// Failure of a whole import. Row-level problems never surface here; they
/// are counted in the `LoadReport` instead.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Why a single data row was dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("unparsable date {0:?}")]
    InvalidDate(String),
    #[error("amount is not a number: {0:?}")]
    InvalidAmount(String),
    #[error("amount must not be negative: {0}")]
    NegativeAmount(f64),
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidInput { field: &'static str, value: f64 },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no calculation to save; calculate your footprint first")]
    MissingSavedResult,
    #[error(transparent)]
    History(#[from] HistoryError),
}
