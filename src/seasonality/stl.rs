//! STL (Seasonal-Trend decomposition using LOESS).
//!
//! Used by [`MSTL`](super::MSTL) to peel one seasonal period at a time off a
//! series. Returns trend, seasonal and remainder of equal length.

use crate::error::DecomposeError;
use crate::utils::stats::median;

/// Result of STL decomposition.
#[derive(Debug, Clone)]
pub struct STLResult {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub remainder: Vec<f64>,
}

/// STL decomposition configuration and algorithm.
#[derive(Debug, Clone)]
pub struct STL {
    seasonal_period: usize,
    /// Seasonal LOESS span (ns).
    seasonal_smoothness: usize,
    /// Trend LOESS span (nt).
    trend_smoothness: usize,
    /// Low-pass LOESS span (nl).
    low_pass_smoothness: usize,
    inner_iterations: usize,
    /// Robustness iterations; zero disables reweighting.
    outer_iterations: usize,
}

impl STL {
    /// Create a new STL decomposer with the given seasonal period.
    pub fn new(seasonal_period: usize) -> Self {
        // Cleveland et al. (1990) defaults
        let p = seasonal_period.max(2) as f64;
        let nt = (1.5 * p / (1.0 - 1.5 / p)).ceil() as usize;

        Self {
            seasonal_period,
            seasonal_smoothness: odd(seasonal_period),
            trend_smoothness: odd(nt),
            low_pass_smoothness: odd(seasonal_period),
            inner_iterations: 2,
            outer_iterations: 0,
        }
    }

    pub fn with_seasonal_smoothness(mut self, ns: usize) -> Self {
        self.seasonal_smoothness = odd(ns);
        self
    }

    pub fn with_trend_smoothness(mut self, nt: usize) -> Self {
        self.trend_smoothness = odd(nt);
        self
    }

    pub fn with_inner_iterations(mut self, n: usize) -> Self {
        self.inner_iterations = n.max(1);
        self
    }

    /// Enable robust fitting with six reweighting passes.
    pub fn robust(self) -> Self {
        self.with_outer_iterations(6)
    }

    pub fn with_outer_iterations(mut self, n: usize) -> Self {
        self.outer_iterations = n;
        self
    }

    /// Decompose the time series.
    pub fn decompose(&self, series: &[f64]) -> Result<STLResult, DecomposeError> {
        let period = self.seasonal_period;
        if period < 2 {
            return Err(DecomposeError::InvalidPeriod(period));
        }
        let n = series.len();
        if n < 2 * period {
            return Err(DecomposeError::InsufficientData {
                needed: 2 * period,
                got: n,
            });
        }
        super::ensure_finite(series)?;

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        for pass in 0..=self.outer_iterations {
            if pass > 0 {
                let remainder = remainder_of(series, &trend, &seasonal);
                weights = bisquare_weights(&remainder);
            }

            for _ in 0..self.inner_iterations {
                let detrended: Vec<f64> =
                    series.iter().zip(trend.iter()).map(|(y, t)| y - t).collect();

                let cycle = self.smooth_cycle_subseries(&detrended, &weights);
                let low_pass = self.low_pass_filter(&cycle);
                for i in 0..n {
                    seasonal[i] = cycle[i] - low_pass[i];
                }

                let deseasonalized: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .map(|(y, s)| y - s)
                    .collect();
                trend = tricube_smooth(&deseasonalized, self.trend_smoothness, &weights);
            }
        }

        let remainder = remainder_of(series, &trend, &seasonal);
        Ok(STLResult {
            trend,
            seasonal,
            remainder,
        })
    }

    /// Smooth each cycle-subseries (all points sharing a phase) separately.
    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let mut result = vec![0.0; detrended.len()];

        for phase in 0..period {
            let indices: Vec<usize> = (phase..detrended.len()).step_by(period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let w: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

            let smoothed = tricube_smooth(&values, self.seasonal_smoothness, &w);
            for (&idx, v) in indices.iter().zip(smoothed) {
                result[idx] = v;
            }
        }

        result
    }

    /// MA(period), MA(period), MA(3), then LOESS.
    fn low_pass_filter(&self, series: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let smoothed = moving_average(&moving_average(&moving_average(series, period), period), 3);
        let weights = vec![1.0; series.len()];
        tricube_smooth(&smoothed, self.low_pass_smoothness, &weights)
    }
}

impl Default for STL {
    fn default() -> Self {
        Self::new(12)
    }
}

fn odd(n: usize) -> usize {
    n | 1
}

fn remainder_of(series: &[f64], trend: &[f64], seasonal: &[f64]) -> Vec<f64> {
    series
        .iter()
        .zip(trend.iter())
        .zip(seasonal.iter())
        .map(|((y, t), s)| y - t - s)
        .collect()
}

/// Locally weighted mean with tricube kernel over a window of `span` points.
fn tricube_smooth(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    let n = values.len();
    let half = span / 2;
    let max_dist = half as f64 + 1.0;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);

            let mut sum_w = 0.0;
            let mut sum_v = 0.0;
            for j in start..end {
                let u = (i as f64 - j as f64).abs() / max_dist;
                let w = (1.0 - u.powi(3)).powi(3) * weights[j];
                sum_w += w;
                sum_v += w * values[j];
            }

            if sum_w > 0.0 {
                sum_v / sum_w
            } else {
                values[i]
            }
        })
        .collect()
}

/// Centered moving average, shrinking the window at the edges.
fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let n = series.len();
    let half = window / 2;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            series[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

/// Bisquare robustness weights from the remainder, scaled by 6 * MAD.
fn bisquare_weights(remainder: &[f64]) -> Vec<f64> {
    let abs: Vec<f64> = remainder.iter().map(|r| r.abs()).collect();
    let h = 6.0 * median(&abs);
    if h < 1e-10 {
        return vec![1.0; remainder.len()];
    }

    abs.iter()
        .map(|a| {
            let u = a / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::stats::variance;

    fn generate_seasonal_series(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let trend = 0.1 * i as f64;
                let seasonal = 10.0 * ((2.0 * std::f64::consts::PI * i as f64 / period as f64).sin());
                trend + seasonal
            })
            .collect()
    }

    fn var(values: &[f64]) -> f64 {
        let v: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        variance(&v).unwrap()
    }

    fn seasonal_strength(result: &STLResult) -> f64 {
        let combined: Vec<f64> = result
            .seasonal
            .iter()
            .zip(result.remainder.iter())
            .map(|(s, r)| s + r)
            .collect();
        1.0 - var(&result.remainder) / var(&combined)
    }

    #[test]
    fn stl_components_reconstruct_series() {
        let period = 12;
        let series = generate_seasonal_series(120, period);

        let result = STL::new(period).decompose(&series).unwrap();

        assert_eq!(result.trend.len(), series.len());
        assert_eq!(result.seasonal.len(), series.len());
        for i in 0..series.len() {
            let reconstructed = result.trend[i] + result.seasonal[i] + result.remainder[i];
            assert!((series[i] - reconstructed).abs() < 1e-10);
        }
    }

    #[test]
    fn stl_seasonal_captures_sine() {
        let period = 12;
        let series = generate_seasonal_series(120, period);

        let result = STL::new(period).decompose(&series).unwrap();

        assert!(seasonal_strength(&result) > 0.5);
    }

    #[test]
    fn stl_trend_only() {
        let series: Vec<f64> = (0..100).map(|i| 5.0 + 0.5 * i as f64).collect();

        let result = STL::new(10).decompose(&series).unwrap();

        assert!(var(&result.seasonal) < var(&series) * 0.1);
    }

    #[test]
    fn stl_constant_series() {
        let series = vec![5.0; 100];

        let result = STL::new(10).decompose(&series).unwrap();

        assert!(result.seasonal.iter().all(|s| s.abs() < 1e-6));
        assert!(result.remainder.iter().all(|r| r.abs() < 1e-6));
    }

    #[test]
    fn stl_insufficient_data() {
        let series = vec![1.0; 10];
        assert_eq!(
            STL::new(12).decompose(&series).unwrap_err(),
            DecomposeError::InsufficientData { needed: 24, got: 10 }
        );
    }

    #[test]
    fn stl_rejects_degenerate_period() {
        let series = vec![1.0; 10];
        assert_eq!(
            STL::new(1).decompose(&series).unwrap_err(),
            DecomposeError::InvalidPeriod(1)
        );
    }

    #[test]
    fn stl_robust_tolerates_outliers() {
        let period = 12;
        let mut series = generate_seasonal_series(120, period);
        series[30] = 100.0;
        series[60] = -100.0;

        let result = STL::new(period).robust().decompose(&series).unwrap();

        assert!(seasonal_strength(&result) > 0.1);
    }

    #[test]
    fn stl_custom_smoothness() {
        let series = generate_seasonal_series(120, 12);

        let result = STL::new(12)
            .with_seasonal_smoothness(7)
            .with_trend_smoothness(21)
            .with_inner_iterations(3)
            .decompose(&series)
            .unwrap();

        assert_eq!(result.trend.len(), series.len());
    }

    #[test]
    fn stl_different_periods() {
        assert!(STL::new(7).decompose(&generate_seasonal_series(70, 7)).is_ok());
        assert!(STL::new(4).decompose(&generate_seasonal_series(40, 4)).is_ok());
    }

    #[test]
    fn bisquare_weights_downweight_outliers() {
        let remainder = vec![0.1, -0.1, 0.2, -0.2, 0.1, 50.0];
        let w = bisquare_weights(&remainder);
        assert!(w[0] > 0.9);
        assert_eq!(w[5], 0.0);
    }
}
