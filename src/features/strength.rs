//! Strength metrics computed from a decomposition.
//!
//! For a component `C` and residual `R`:
//!
//! ```text
//! strength(C) = max(0, |1 - Var(R) / Var(C + R)|)
//! resid_var   = Std(R) / Mean(y)
//! ```
//!
//! The absolute value departs from the textbook `1 - Var(R) / Var(C + R)`
//! (Wang, Smith & Hyndman 2006). Whenever the residual variance exceeds the
//! combined variance the ratio is above one, and the absolute value turns a
//! poor decomposition into a positive strength that can exceed 1. The formula
//! is kept as-is for compatibility with existing feature tables.

use crate::seasonality::Decomposition;
use crate::utils::stats;
use tracing::warn;

/// Strength of one seasonal component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentStrength {
    /// Seasonal period of the component.
    pub period: usize,
    pub strength: Option<f64>,
}

/// Strength metrics of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthMetrics {
    pub trend_strength: Option<f64>,
    /// One entry per seasonal component, in decomposition order.
    pub seasonal_strength: Vec<ComponentStrength>,
    pub resid_var: Option<f64>,
}

/// Strength of `component` relative to the residual.
///
/// Rows where either side is `None` are skipped in the combined variance.
/// Returns `None` when fewer than two rows are defined, and `0.0` when the
/// combined variance is zero. The result does not depend on the units of the
/// series.
pub fn strength(component: &[Option<f64>], resid: &[Option<f64>]) -> Option<f64> {
    let var_resid = stats::variance(resid)?;
    let var_combined = stats::variance(&stats::add(component, resid))?;

    let ratio = var_resid / var_combined;
    if var_combined == 0.0 || !ratio.is_finite() {
        warn!(var_combined, var_resid, "degenerate combined variance, strength set to 0");
        return Some(0.0);
    }

    Some((1.0 - ratio).abs().max(0.0))
}

/// Residual standard deviation over the mean of the original series.
///
/// `None` when the residual has fewer than two defined rows or the target
/// mean is zero.
pub fn resid_var(resid: &[Option<f64>], target: &[f64]) -> Option<f64> {
    let std = stats::std_dev(resid)?;
    let target: Vec<Option<f64>> = target.iter().copied().map(Some).collect();
    let mean = stats::mean(&target)?;
    if mean == 0.0 {
        return None;
    }
    Some(std / mean)
}

/// All strength metrics of one decomposed series.
pub fn measure(decomposition: &Decomposition, target: &[f64]) -> StrengthMetrics {
    let resid = &decomposition.resid;

    let seasonal_strength = decomposition
        .seasonal
        .iter()
        .map(|component| {
            let values: Vec<Option<f64>> = component.values.iter().copied().map(Some).collect();
            ComponentStrength {
                period: component.period,
                strength: strength(&values, resid),
            }
        })
        .collect();

    StrengthMetrics {
        trend_strength: strength(&decomposition.trend, resid),
        seasonal_strength,
        resid_var: resid_var(resid, target),
    }
}
