//! Input validation for feature extraction.
//!
//! All checks run before any decomposition work and have no side effects.
//! Emptiness is checked first, so an empty frame is reported as
//! [`FeatureError::EmptyInput`] whatever the other arguments are.
//!
//! # Example
//!
//! ```
//! use polars::prelude::*;
//! use seasonal_features::validation::validate_raw;
//! use seasonal_features::FeatureError;
//!
//! let df = df!("id" => ["A"], "ds" => [1i64], "y" => [1.0]).unwrap();
//!
//! let err = validate_raw(&df, "id", "ds", "y", 12, None, "mstl").unwrap_err();
//! assert!(matches!(err, FeatureError::InvalidSeasonalFrequencies(_)));
//! ```

use crate::core::{ColumnMapping, DecompositionMode, FeatureParams, ModeKind};
use crate::error::{FeatureError, Result};
use polars::prelude::DataFrame;
use tracing::debug;

/// Names in `columns` that `df` lacks, in (id, time, target) order.
pub fn missing_columns(df: &DataFrame, columns: &ColumnMapping) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for name in columns.columns() {
        if df.column(name).is_err() && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    missing
}

fn check_frame(df: &DataFrame, columns: &ColumnMapping) -> Result<()> {
    if df.height() == 0 {
        return Err(FeatureError::EmptyInput);
    }
    let missing = missing_columns(df, columns);
    if !missing.is_empty() {
        return Err(FeatureError::MissingColumn { columns: missing });
    }
    Ok(())
}

fn check_periods(periods: &[usize]) -> Result<()> {
    DecompositionMode::mstl(periods.to_vec()).map(|_| ())
}

/// Validate typed parameters against a frame.
pub fn validate_frame(df: &DataFrame, params: &FeatureParams) -> Result<()> {
    check_frame(df, &params.columns)?;
    if params.ts_freq == 0 {
        return Err(FeatureError::InvalidFrequency(0));
    }
    if let DecompositionMode::Mstl { periods } = &params.mode {
        check_periods(periods)?;
    }
    Ok(())
}

/// Validate dynamic arguments and turn them into [`FeatureParams`].
pub fn validate_raw(
    df: &DataFrame,
    id_col: &str,
    time_col: &str,
    target_col: &str,
    ts_freq: i64,
    seasonal_freqs: Option<&[i64]>,
    mode: &str,
) -> Result<FeatureParams> {
    let columns = ColumnMapping::new(id_col, time_col, target_col);
    check_frame(df, &columns)?;

    let ts_freq = u32::try_from(ts_freq)
        .ok()
        .filter(|&f| f > 0)
        .ok_or(FeatureError::InvalidFrequency(ts_freq))?;

    let mode = match mode.parse::<ModeKind>()? {
        ModeKind::Simple => {
            if seasonal_freqs.is_some() {
                debug!("seasonal_freqs ignored in simple mode");
            }
            DecompositionMode::Simple
        }
        ModeKind::Mstl => {
            let freqs = seasonal_freqs.ok_or_else(|| {
                FeatureError::InvalidSeasonalFrequencies(
                    "at least one seasonal frequency is required in mstl mode".to_string(),
                )
            })?;
            let periods = freqs
                .iter()
                .map(|&f| {
                    usize::try_from(f).ok().filter(|&p| p > 0).ok_or_else(|| {
                        FeatureError::InvalidSeasonalFrequencies(format!(
                            "seasonal frequency {} is not a positive integer",
                            f
                        ))
                    })
                })
                .collect::<Result<Vec<usize>>>()?;
            DecompositionMode::mstl(periods)?
        }
    };

    Ok(FeatureParams::new(columns, ts_freq).with_mode(mode))
}
