//! MSTL (Multiple Seasonal-Trend decomposition using LOESS).
//!
//! MSTL extends STL to series carrying several seasonal periods at once, such
//! as daily and weekly patterns in hourly data. Components are refined
//! iteratively: the trend is re-estimated on the deseasonalized series, then
//! each seasonal component on the series minus the trend and the other
//! seasonal components.

use super::stl::STL;
use super::{
    ensure_finite, MultiSeasonalDecomposer, MultiSeasonalDecomposition, SeasonalComponent,
};
use crate::core::CalendarFrequency;
use crate::error::DecomposeError;
use tracing::debug;

/// MSTL decomposition engine.
///
/// # Example
///
/// ```
/// use seasonal_features::core::CalendarFrequency;
/// use seasonal_features::seasonality::{MultiSeasonalDecomposer, MSTL};
///
/// let series: Vec<f64> = (0..96)
///     .map(|i| 10.0 + (i % 4) as f64 + 2.0 * (i % 12) as f64)
///     .collect();
/// let result = MSTL::new()
///     .decompose(&series, &[12, 4], CalendarFrequency::Monthly)
///     .unwrap();
///
/// assert_eq!(result.seasonal.len(), 2);
/// assert_eq!(result.seasonal[0].name(), "seasonal_4");
/// ```
#[derive(Debug, Clone)]
pub struct MSTL {
    /// Number of refinement iterations.
    iterations: usize,
    /// Use robust STL fits.
    robust: bool,
}

impl MSTL {
    pub fn new() -> Self {
        Self {
            iterations: 2,
            robust: false,
        }
    }

    /// Set number of iterations.
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n.max(1);
        self
    }

    /// Enable robust fitting.
    pub fn robust(mut self) -> Self {
        self.robust = true;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn is_robust(&self) -> bool {
        self.robust
    }

    /// Sort ascending and drop duplicates.
    pub fn normalize_periods(periods: &[usize]) -> Vec<usize> {
        let mut periods = periods.to_vec();
        periods.sort_unstable();
        periods.dedup();
        periods
    }

    fn stl(&self, period: usize) -> STL {
        if self.robust {
            STL::new(period).robust()
        } else {
            STL::new(period)
        }
    }
}

impl Default for MSTL {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiSeasonalDecomposer for MSTL {
    fn decompose(
        &self,
        values: &[f64],
        periods: &[usize],
        freq: CalendarFrequency,
    ) -> Result<MultiSeasonalDecomposition, DecomposeError> {
        let periods = Self::normalize_periods(periods);
        let (Some(&min_period), Some(&max_period)) = (periods.first(), periods.last()) else {
            return Err(DecomposeError::ComputationError(
                "no seasonal periods given".to_string(),
            ));
        };
        if min_period < 2 {
            return Err(DecomposeError::InvalidPeriod(min_period));
        }
        let n = values.len();
        if n < 2 * max_period {
            return Err(DecomposeError::InsufficientData {
                needed: 2 * max_period,
                got: n,
            });
        }
        ensure_finite(values)?;
        debug!(n, ?periods, %freq, robust = self.is_robust(), "mstl decomposition");

        let mut seasonal: Vec<Vec<f64>> = vec![vec![0.0; n]; periods.len()];
        let mut trend = vec![0.0; n];

        for _ in 0..self.iterations {
            let deseasonalized: Vec<f64> = (0..n)
                .map(|i| values[i] - seasonal.iter().map(|s| s[i]).sum::<f64>())
                .collect();
            trend = self.stl(max_period).decompose(&deseasonalized)?.trend;

            for (idx, &period) in periods.iter().enumerate() {
                let adjusted: Vec<f64> = (0..n)
                    .map(|i| {
                        let others: f64 = seasonal
                            .iter()
                            .enumerate()
                            .filter(|(other, _)| *other != idx)
                            .map(|(_, s)| s[i])
                            .sum();
                        values[i] - trend[i] - others
                    })
                    .collect();
                seasonal[idx] = self.stl(period).decompose(&adjusted)?.seasonal;
            }
        }

        Ok(MultiSeasonalDecomposition {
            trend,
            seasonal: periods
                .into_iter()
                .zip(seasonal)
                .map(|(period, values)| SeasonalComponent::new(period, values))
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "MSTL"
    }
}
