//! Typed errors for the data and statistics layers.
//!
//! The orchestration code in `main.rs` wraps these in `anyhow` with
//! context; the lower layers return them directly so tests can match on
//! the variant.

use thiserror::Error;

/// Errors raised while reading, cleaning or writing survey data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("required column '{column}' not found in {file}")]
    MissingColumn { column: String, file: String },

    #[error("line {line}: unknown skill rating '{label}' in column '{column}'")]
    UnknownRating {
        line: u64,
        column: String,
        label: String,
    },

    #[error("line {line}: missing skill rating in column '{column}'")]
    MissingRating { line: u64, column: String },

    #[error("line {line}: unknown level of study '{label}'")]
    UnknownLevel { line: u64, label: String },

    #[error("line {line}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the statistical routines.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("{test} requires at least {required} observations, got {actual}")]
    InsufficientData {
        test: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{0} is undefined when the data has zero variance")]
    ZeroVariance(&'static str),

    #[error("invalid distribution parameters: {0}")]
    Distribution(String),
}

/// Shorthand for results of the statistics layer.
pub type StatsResult<T> = Result<T, StatsError>;
