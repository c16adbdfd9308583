//! Classical (moving-average) seasonal decomposition.
//!
//! Splits a series into:
//! - Trend: centered moving average over one seasonal cycle
//! - Seasonal: per-phase average of the detrended series
//! - Residual: what trend and seasonal leave unexplained
//!
//! The trend is undefined for the first and last `period / 2` observations,
//! so those rows carry `None` trend and residual.

use super::{ensure_finite, Decomposition, SeasonalComponent, SeasonalDecomposer};
use crate::error::DecomposeError;

/// How the components combine into the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DecompositionModel {
    /// y = trend + seasonal + resid
    #[default]
    Additive,
    /// y = trend * seasonal * resid
    Multiplicative,
}

impl DecompositionModel {
    fn detrend(&self, value: f64, trend: f64) -> f64 {
        match self {
            Self::Additive => value - trend,
            Self::Multiplicative => value / trend,
        }
    }

    fn residual(&self, value: f64, trend: f64, seasonal: f64) -> f64 {
        match self {
            Self::Additive => value - trend - seasonal,
            Self::Multiplicative => value / (trend * seasonal),
        }
    }
}

/// Classical decomposition engine.
///
/// Requires at least two full seasonal cycles per series.
///
/// # Example
///
/// ```
/// use seasonal_features::seasonality::{ClassicalDecomposition, DecompositionModel, SeasonalDecomposer};
///
/// let series: Vec<f64> = (0..24).map(|i| i as f64 + [1.0, -1.0, 2.0, -2.0][i % 4]).collect();
/// let result = ClassicalDecomposition
///     .decompose(&series, 4, DecompositionModel::Additive)
///     .unwrap();
///
/// assert_eq!(result.seasonal[0].name(), "seasonal_4");
/// assert!(result.trend[0].is_none());
/// assert!(result.trend[2].is_some());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalDecomposition;

impl ClassicalDecomposition {
    pub fn new() -> Self {
        Self
    }
}

impl SeasonalDecomposer for ClassicalDecomposition {
    fn decompose(
        &self,
        values: &[f64],
        period: usize,
        model: DecompositionModel,
    ) -> Result<Decomposition, DecomposeError> {
        if period < 2 {
            return Err(DecomposeError::InvalidPeriod(period));
        }
        let n = values.len();
        if n < 2 * period {
            return Err(DecomposeError::InsufficientData {
                needed: 2 * period,
                got: n,
            });
        }
        ensure_finite(values)?;
        if model == DecompositionModel::Multiplicative && values.iter().any(|&v| v <= 0.0) {
            return Err(DecomposeError::NonPositiveValues);
        }

        let trend = centered_moving_average(values, period);

        // Average the detrended series per phase of the cycle
        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];
        for (i, (&y, t)) in values.iter().zip(trend.iter()).enumerate() {
            if let Some(t) = t {
                sums[i % period] += model.detrend(y, *t);
                counts[i % period] += 1;
            }
        }
        let mut phase: Vec<f64> = Vec::with_capacity(period);
        for (sum, count) in sums.iter().zip(counts.iter()) {
            if *count == 0 {
                return Err(DecomposeError::ComputationError(
                    "seasonal phase without a defined trend value".to_string(),
                ));
            }
            phase.push(sum / *count as f64);
        }

        let center = phase.iter().sum::<f64>() / period as f64;
        match model {
            DecompositionModel::Additive => phase.iter_mut().for_each(|p| *p -= center),
            DecompositionModel::Multiplicative => {
                if center.abs() < 1e-12 {
                    return Err(DecomposeError::ComputationError(
                        "seasonal factors average to zero".to_string(),
                    ));
                }
                phase.iter_mut().for_each(|p| *p /= center)
            }
        }

        let seasonal: Vec<f64> = (0..n).map(|i| phase[i % period]).collect();
        let resid: Vec<Option<f64>> = values
            .iter()
            .zip(trend.iter())
            .zip(seasonal.iter())
            .map(|((&y, t), &s)| t.map(|t| model.residual(y, t, s)))
            .collect();

        Ok(Decomposition {
            trend,
            seasonal: vec![SeasonalComponent::new(period, seasonal)],
            resid,
        })
    }

    fn name(&self) -> &str {
        "Classical"
    }
}

/// Centered moving average over one cycle.
///
/// Odd periods use a plain window of `period` points; even periods use a
/// `2 x period` average (half weights on both ends of a `period + 1` window).
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![None; n];
    if n < 2 * half + 1 {
        return trend;
    }

    for i in half..n - half {
        let window = &values[i - half..=i + half];
        let sum = if period % 2 == 0 {
            let last = window.len() - 1;
            window[1..last].iter().sum::<f64>() + 0.5 * (window[0] + window[last])
        } else {
            window.iter().sum::<f64>()
        };
        trend[i] = Some(sum / period as f64);
    }

    trend
}
