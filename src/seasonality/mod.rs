//! Seasonal decomposition engines.
//!
//! This module provides the decomposers the feature pipeline runs per series:
//! - Classical: centered moving-average decomposition for a single period
//! - STL: Seasonal-Trend decomposition using LOESS
//! - MSTL: Multiple seasonal-trend decomposition for multiple periods
//!
//! Both pipeline seams are traits, so alternative engines can be plugged into
//! [`FeatureExtractor`](crate::features::FeatureExtractor).

mod classical;
mod mstl;
mod stl;

pub use classical::{ClassicalDecomposition, DecompositionModel};
pub use mstl::MSTL;
pub use stl::{STLResult, STL};

use crate::core::CalendarFrequency;
use crate::error::DecomposeError;

/// One seasonal component of a decomposition, aligned with the input rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalComponent {
    /// Seasonal period in observations.
    pub period: usize,
    /// Component value for every row.
    pub values: Vec<f64>,
}

impl SeasonalComponent {
    pub fn new(period: usize, values: Vec<f64>) -> Self {
        Self { period, values }
    }

    /// Column name of the component, e.g. `seasonal_12`.
    pub fn name(&self) -> String {
        format!("seasonal_{}", self.period)
    }
}

/// Trend, seasonal and residual components of one series.
///
/// `trend` and `resid` are `None` where the decomposition leaves them
/// undefined (moving-average edges).
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<SeasonalComponent>,
    pub resid: Vec<Option<f64>>,
}

impl Decomposition {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.trend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trend.is_empty()
    }
}

/// Output of a multi-seasonal decomposition: trend plus one seasonal
/// component per period. The residual is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSeasonalDecomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<SeasonalComponent>,
}

impl MultiSeasonalDecomposition {
    /// Sum of all seasonal components per row.
    pub fn total_seasonal(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.trend.len()];
        for component in &self.seasonal {
            for (t, v) in total.iter_mut().zip(component.values.iter()) {
                *t += v;
            }
        }
        total
    }
}

/// Single-period decomposition engine.
pub trait SeasonalDecomposer {
    /// Decompose time-ordered `values` with seasonal `period`.
    fn decompose(
        &self,
        values: &[f64],
        period: usize,
        model: DecompositionModel,
    ) -> Result<Decomposition, DecomposeError>;

    /// Engine name, used in logs.
    fn name(&self) -> &str;
}

/// Multi-period decomposition engine.
pub trait MultiSeasonalDecomposer {
    /// Decompose time-ordered `values` into a trend and one seasonal
    /// component per period in `periods`.
    fn decompose(
        &self,
        values: &[f64],
        periods: &[usize],
        freq: CalendarFrequency,
    ) -> Result<MultiSeasonalDecomposition, DecomposeError>;

    /// Engine name, used in logs.
    fn name(&self) -> &str;
}

/// Reject null/non-finite input before decomposing.
pub(crate) fn ensure_finite(values: &[f64]) -> Result<(), DecomposeError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(DecomposeError::MissingValues)
    }
}
