//! Feature assembly: validate, decompose every series, measure, reshape.
//!
//! One call runs `validate -> simple | mstl -> reshape` in a single pass.
//! Decomposer failures are returned unchanged as
//! [`FeatureError::Decomposer`]; no partial tables are produced.

use super::strength::{measure, StrengthMetrics};
use crate::core::table::{feature_row, key_label, partition_series, stack_rows};
use crate::core::{CalendarFrequency, DecompositionMode, FeatureParams, SeriesGroup};
use crate::error::{DecomposeError, Result};
use crate::seasonality::{
    ClassicalDecomposition, Decomposition, DecompositionModel, MultiSeasonalDecomposer,
    MultiSeasonalDecomposition, SeasonalDecomposer, MSTL,
};
use crate::validation::{validate_frame, validate_raw};
use polars::prelude::DataFrame;
use tracing::{debug, debug_span};

/// Output column holding the trend strength.
pub const TREND_STRENGTH: &str = "trend_strength";
/// Output column holding the seasonal strength in simple mode.
pub const SEASONAL_STRENGTH: &str = "seasonal_strength";
/// Output column holding the residual variance ratio.
pub const RESID_VAR: &str = "resid_var";

/// Features of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFeatures {
    /// Series id rendered as text; `None` for a null id.
    pub id: Option<String>,
    pub trend_strength: Option<f64>,
    /// `(column name, strength)` per seasonal component.
    pub seasonal_strength: Vec<(String, Option<f64>)>,
    pub resid_var: Option<f64>,
}

impl SeriesFeatures {
    /// Output columns in table order, without the id.
    ///
    /// A single `seasonal_strength` follows `trend_strength`; per-period
    /// `seasonal_<p>_strength` columns precede it.
    pub fn columns(&self) -> Vec<(String, Option<f64>)> {
        let trend = (TREND_STRENGTH.to_string(), self.trend_strength);
        let per_period = self
            .seasonal_strength
            .iter()
            .any(|(name, _)| name != SEASONAL_STRENGTH);

        let mut columns = Vec::with_capacity(self.seasonal_strength.len() + 2);
        if !per_period {
            columns.push(trend.clone());
        }
        columns.extend(self.seasonal_strength.iter().cloned());
        if per_period {
            columns.push(trend);
        }
        columns.push((RESID_VAR.to_string(), self.resid_var));
        columns
    }
}

/// Resolved decomposition path, fixed before any series is decomposed.
#[derive(Debug, Clone)]
enum Path<'a> {
    Simple {
        period: usize,
        model: DecompositionModel,
    },
    Mstl {
        periods: &'a [usize],
        freq: CalendarFrequency,
    },
}

/// Computes decomposition features for every series of a frame.
///
/// # Example
///
/// ```
/// use polars::prelude::*;
/// use seasonal_features::core::{ColumnMapping, FeatureParams};
/// use seasonal_features::features::FeatureExtractor;
///
/// let n = 36;
/// let ids: Vec<&str> = (0..2 * n).map(|i| if i < n { "A" } else { "B" }).collect();
/// let months: Vec<i64> = (0..2 * n as i64).map(|i| i % n as i64).collect();
/// let sales: Vec<f64> = (0..2 * n)
///     .map(|i| 100.0 + (i % n) as f64 + [5.0, -3.0, 1.0, -3.0][i % 4])
///     .collect();
/// let df = df!("store" => ids, "month" => months, "sales" => sales).unwrap();
///
/// let params = FeatureParams::new(ColumnMapping::new("store", "month", "sales"), 4);
/// let features = FeatureExtractor::new().extract(&df, &params).unwrap();
///
/// assert_eq!(features.height(), 2);
/// let names: Vec<String> = features.get_column_names().iter().map(|c| c.to_string()).collect();
/// assert_eq!(names, ["store", "trend_strength", "seasonal_strength", "resid_var"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor<C = ClassicalDecomposition, M = MSTL> {
    classical: C,
    multi_seasonal: M,
}

impl FeatureExtractor {
    /// Extractor backed by [`ClassicalDecomposition`] and [`MSTL`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C, M> FeatureExtractor<C, M>
where
    C: SeasonalDecomposer,
    M: MultiSeasonalDecomposer,
{
    /// Extractor with custom decomposition engines.
    pub fn with_decomposers(classical: C, multi_seasonal: M) -> Self {
        Self {
            classical,
            multi_seasonal,
        }
    }

    /// Feature table with one row per distinct id, in order of first
    /// appearance.
    pub fn extract(&self, df: &DataFrame, params: &FeatureParams) -> Result<DataFrame> {
        let rows = self
            .run(df, params)?
            .into_iter()
            .map(|(group, features)| feature_row(&group.key, &features.columns()))
            .collect::<Result<Vec<_>>>()?;
        stack_rows(rows)
    }

    /// Same pipeline as [`extract`](Self::extract), returning typed rows.
    pub fn features(&self, df: &DataFrame, params: &FeatureParams) -> Result<Vec<SeriesFeatures>> {
        Ok(self
            .run(df, params)?
            .into_iter()
            .map(|(_, features)| features)
            .collect())
    }

    fn run(
        &self,
        df: &DataFrame,
        params: &FeatureParams,
    ) -> Result<Vec<(SeriesGroup, SeriesFeatures)>> {
        let span = debug_span!(
            "seasonal_decompose_features",
            mode = params.mode.name(),
            ts_freq = params.ts_freq,
            rows = df.height()
        );
        let _guard = span.enter();

        validate_frame(df, params)?;
        let path = match &params.mode {
            DecompositionMode::Simple => Path::Simple {
                period: params.ts_freq as usize,
                model: params.model,
            },
            DecompositionMode::Mstl { periods } => Path::Mstl {
                periods,
                freq: params.calendar_frequency()?,
            },
        };

        let groups = partition_series(df, &params.columns)?;
        debug!(series = groups.len(), ?path, "decomposing series");

        groups
            .into_iter()
            .map(|group| {
                let features = self.series_features(&group, &params.columns.id, &path)?;
                Ok((group, features))
            })
            .collect()
    }

    fn series_features(
        &self,
        group: &SeriesGroup,
        id_col: &str,
        path: &Path<'_>,
    ) -> Result<SeriesFeatures> {
        let id = key_label(&group.key, id_col)?;
        let values = complete_values(&group.values)?;

        let (decomposition, per_period) = match path {
            Path::Simple { period, model } => {
                debug!(id = ?id, n = values.len(), engine = self.classical.name(), "decompose");
                (self.classical.decompose(&values, *period, *model)?, false)
            }
            Path::Mstl { periods, freq } => {
                debug!(id = ?id, n = values.len(), engine = self.multi_seasonal.name(), "decompose");
                let d = self.multi_seasonal.decompose(&values, periods, *freq)?;
                (with_residual(&values, d), true)
            }
        };

        let StrengthMetrics {
            trend_strength,
            seasonal_strength,
            resid_var,
        } = measure(&decomposition, &values);

        Ok(SeriesFeatures {
            id,
            trend_strength,
            seasonal_strength: seasonal_strength
                .into_iter()
                .map(|c| {
                    let name = if per_period {
                        format!("seasonal_{}_strength", c.period)
                    } else {
                        SEASONAL_STRENGTH.to_string()
                    };
                    (name, c.strength)
                })
                .collect(),
            resid_var,
        })
    }
}

/// Target values with nulls rejected.
fn complete_values(values: &[Option<f64>]) -> std::result::Result<Vec<f64>, DecomposeError> {
    values
        .iter()
        .map(|v| v.ok_or(DecomposeError::MissingValues))
        .collect()
}

/// Residual of a multi-seasonal fit: value - (trend + all seasonal components).
pub fn with_residual(values: &[f64], decomposition: MultiSeasonalDecomposition) -> Decomposition {
    let seasonal_total = decomposition.total_seasonal();
    let resid = values
        .iter()
        .zip(decomposition.trend.iter())
        .zip(seasonal_total.iter())
        .map(|((y, t), s)| Some(y - (t + s)))
        .collect();

    Decomposition {
        trend: decomposition.trend.into_iter().map(Some).collect(),
        seasonal: decomposition.seasonal,
        resid,
    }
}

/// Decomposition features of every series in `df`.
///
/// Validates the arguments, decomposes each series identified by `id_col`
/// (ordered by `time_col`) and returns one row per id with
/// `trend_strength`, the seasonal strength column(s) and `resid_var`.
///
/// * `mode = "simple"`: classical decomposition with period `ts_freq`; a single
///   `seasonal_strength` column.
/// * `mode = "mstl"`: multi-seasonal decomposition over `seasonal_freqs`;
///   `ts_freq` must be one of 4, 12, 24 or 52. One
///   `seasonal_<period>_strength` column per period, in ascending period
///   order, placed before `trend_strength`.
pub fn seasonal_decompose_features(
    df: &DataFrame,
    id_col: &str,
    time_col: &str,
    target_col: &str,
    ts_freq: i64,
    seasonal_freqs: Option<&[i64]>,
    mode: &str,
) -> Result<DataFrame> {
    let params = validate_raw(df, id_col, time_col, target_col, ts_freq, seasonal_freqs, mode)?;
    FeatureExtractor::new().extract(df, &params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColumnMapping;
    use crate::error::FeatureError;
    use crate::seasonality::SeasonalComponent;
    use approx::assert_relative_eq;
    use polars::prelude::*;

    fn frame(ids: &[&str], n: usize) -> DataFrame {
        let mut id = Vec::new();
        let mut t = Vec::new();
        let mut y = Vec::new();
        for (k, name) in ids.iter().enumerate() {
            for i in 0..n {
                id.push(*name);
                t.push(i as i64);
                y.push(50.0 + k as f64 * 10.0 + 0.3 * i as f64 + [4.0, -2.0, 1.0, -3.0][i % 4]);
            }
        }
        df!("id" => id, "t" => t, "y" => y).unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|c| c.to_string()).collect()
    }

    fn params(ts_freq: u32) -> FeatureParams {
        FeatureParams::new(ColumnMapping::new("id", "t", "y"), ts_freq)
    }

    /// Fixed output, so the extractor can be checked without a real engine.
    struct FlatMulti;

    impl MultiSeasonalDecomposer for FlatMulti {
        fn decompose(
            &self,
            values: &[f64],
            periods: &[usize],
            _freq: CalendarFrequency,
        ) -> std::result::Result<MultiSeasonalDecomposition, DecomposeError> {
            Ok(MultiSeasonalDecomposition {
                trend: values.to_vec(),
                seasonal: periods
                    .iter()
                    .map(|&p| SeasonalComponent::new(p, vec![0.0; values.len()]))
                    .collect(),
            })
        }

        fn name(&self) -> &str {
            "Flat"
        }
    }

    struct Failing;

    impl SeasonalDecomposer for Failing {
        fn decompose(
            &self,
            _values: &[f64],
            _period: usize,
            _model: DecompositionModel,
        ) -> std::result::Result<Decomposition, DecomposeError> {
            Err(DecomposeError::ComputationError("boom".to_string()))
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    #[test]
    fn simple_path_yields_one_row_per_series() {
        let df = frame(&["A", "B", "C"], 24);

        let out = FeatureExtractor::new().extract(&df, &params(4)).unwrap();

        assert_eq!(out.height(), 3);
        assert_eq!(
            names(&out),
            ["id", "trend_strength", "seasonal_strength", "resid_var"]
        );
    }

    #[test]
    fn typed_rows_match_frame() {
        let df = frame(&["A", "B"], 24);
        let extractor = FeatureExtractor::new();

        let rows = extractor.features(&df, &params(4)).unwrap();
        let out = extractor.extract(&df, &params(4)).unwrap();

        let trend = out
            .column("trend_strength")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .clone();
        assert_eq!(rows[0].id.as_deref(), Some("A"));
        assert_eq!(rows[1].id.as_deref(), Some("B"));
        assert_eq!(trend.get(0), rows[0].trend_strength);
        assert_eq!(trend.get(1), rows[1].trend_strength);
    }

    #[test]
    fn mstl_path_names_strength_per_period() {
        let df = frame(&["A", "B"], 48);
        let p = params(12).with_seasonal_periods(vec![4, 12]).unwrap();

        let out = FeatureExtractor::new().extract(&df, &p).unwrap();

        assert_eq!(out.height(), 2);
        assert_eq!(
            names(&out),
            [
                "id",
                "seasonal_4_strength",
                "seasonal_12_strength",
                "trend_strength",
                "resid_var"
            ]
        );
    }

    #[test]
    fn mstl_residual_is_derived_from_components() {
        let df = frame(&["A"], 12);
        let p = params(4).with_seasonal_periods(vec![2]).unwrap();
        let extractor = FeatureExtractor::with_decomposers(ClassicalDecomposition, FlatMulti);

        let rows = extractor.features(&df, &p).unwrap();

        // trend == values and seasonal == 0 leave a zero residual
        assert_eq!(rows[0].resid_var, Some(0.0));
        assert_eq!(rows[0].seasonal_strength[0].0, "seasonal_2_strength");
    }

    #[test]
    fn mstl_rejects_unmapped_frequency_before_decomposing() {
        let df = frame(&["A"], 48);
        let p = params(7).with_seasonal_periods(vec![7]).unwrap();
        let extractor = FeatureExtractor::with_decomposers(Failing, FlatMulti);

        assert_eq!(
            extractor.extract(&df, &p).unwrap_err(),
            FeatureError::UnsupportedFrequency(7)
        );
    }

    #[test]
    fn decomposer_errors_propagate_unchanged() {
        let df = frame(&["A"], 24);
        let extractor = FeatureExtractor::with_decomposers(Failing, MSTL::new());

        assert_eq!(
            extractor.extract(&df, &params(4)).unwrap_err(),
            FeatureError::Decomposer(DecomposeError::ComputationError("boom".to_string()))
        );
    }

    #[test]
    fn null_targets_fail_the_call() {
        let df = df!(
            "id" => ["A"; 8],
            "t" => [0i64, 1, 2, 3, 4, 5, 6, 7],
            "y" => [Some(1.0), Some(2.0), None, Some(4.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
        )
        .unwrap();

        assert_eq!(
            FeatureExtractor::new().extract(&df, &params(4)).unwrap_err(),
            FeatureError::Decomposer(DecomposeError::MissingValues)
        );
    }

    #[test]
    fn mstl_decomposer_errors_propagate_unchanged() {
        let df = frame(&["A", "B"], 12);
        let err = seasonal_decompose_features(&df, "id", "t", "y", 12, Some(&[12][..]), "mstl")
            .unwrap_err();

        assert_eq!(
            err,
            FeatureError::Decomposer(DecomposeError::InsufficientData { needed: 24, got: 12 })
        );
    }

    #[test]
    fn column_order_follows_mode() {
        let simple = SeriesFeatures {
            id: Some("A".to_string()),
            trend_strength: Some(0.5),
            seasonal_strength: vec![(SEASONAL_STRENGTH.to_string(), Some(0.7))],
            resid_var: Some(0.1),
        };
        let order: Vec<String> = simple.columns().into_iter().map(|(name, _)| name).collect();
        assert_eq!(order, ["trend_strength", "seasonal_strength", "resid_var"]);

        let mstl = SeriesFeatures {
            seasonal_strength: vec![
                ("seasonal_4_strength".to_string(), Some(0.7)),
                ("seasonal_12_strength".to_string(), Some(0.2)),
            ],
            ..simple
        };
        let order: Vec<String> = mstl.columns().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            order,
            ["seasonal_4_strength", "seasonal_12_strength", "trend_strength", "resid_var"]
        );
    }

    #[test]
    fn with_residual_subtracts_all_components() {
        let d = MultiSeasonalDecomposition {
            trend: vec![1.0, 1.0],
            seasonal: vec![
                SeasonalComponent::new(2, vec![0.5, -0.5]),
                SeasonalComponent::new(3, vec![0.25, 0.25]),
            ],
        };

        let full = with_residual(&[2.0, 1.0], d);

        assert_relative_eq!(full.resid[0].unwrap(), 0.25, epsilon = 1e-12);
        assert_relative_eq!(full.resid[1].unwrap(), 0.25, epsilon = 1e-12);
        assert!(full.trend.iter().all(Option::is_some));
    }

    #[test]
    fn dynamic_entry_point_validates_first() {
        let df = frame(&["A"], 24);
        assert_eq!(
            seasonal_decompose_features(&df, "id", "t", "missing", 4, None, "simple").unwrap_err(),
            FeatureError::MissingColumn {
                columns: vec!["missing".to_string()]
            }
        );
    }
}
