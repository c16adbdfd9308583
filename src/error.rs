//! Error types for the seasonal-features library.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type alias for feature extraction.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors raised by a decomposition engine for a single series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecomposeError {
    /// Series is too short for the requested period.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Seasonal period cannot be decomposed.
    #[error("invalid seasonal period {0}: must be at least 2")]
    InvalidPeriod(usize),

    /// Multiplicative decomposition on zero or negative values.
    #[error("multiplicative decomposition requires strictly positive values")]
    NonPositiveValues,

    /// Null or non-finite values in the series.
    #[error("missing values detected in data")]
    MissingValues,

    /// Numerical failure inside the decomposition.
    #[error("computation error: {0}")]
    ComputationError(String),
}

/// Errors that can occur while extracting decomposition features.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// One or more of the id/time/target columns are absent.
    #[error("columns {columns:?} are missing from the DataFrame")]
    MissingColumn { columns: Vec<String> },

    /// Series frequency is not a positive integer.
    #[error("invalid ts_freq '{0}': it must be a positive integer")]
    InvalidFrequency(i64),

    /// Input table has no rows.
    #[error("the DataFrame is empty, cannot perform decomposition")]
    EmptyInput,

    /// Mode is neither "simple" nor "mstl".
    #[error("invalid mode '{0}': expected \"simple\" or \"mstl\"")]
    InvalidMode(String),

    /// Seasonal frequencies missing, empty or not positive integers.
    #[error("invalid seasonal frequencies: {0}")]
    InvalidSeasonalFrequencies(String),

    /// Series frequency has no calendar mapping for the multi-seasonal path.
    #[error("unsupported frequency {0} for mstl decomposition: expected one of 4, 12, 24, 52")]
    UnsupportedFrequency(u32),

    /// Failure surfaced by a decomposition engine.
    #[error("decomposition failed: {0}")]
    Decomposer(#[from] DecomposeError),

    /// Failure in the tabular engine while partitioning or reshaping.
    #[error("table error: {0}")]
    Table(String),
}

impl From<PolarsError> for FeatureError {
    fn from(err: PolarsError) -> Self {
        FeatureError::Table(err.to_string())
    }
}
