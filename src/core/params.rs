//! Parameters describing one feature-extraction call.

use crate::error::{FeatureError, Result};
use crate::seasonality::DecompositionModel;
use std::fmt;
use std::str::FromStr;

/// Canonical id column name used by the multi-seasonal path.
pub const CANONICAL_ID: &str = "unique_id";
/// Canonical timestamp column name used by the multi-seasonal path.
pub const CANONICAL_TIME: &str = "ds";
/// Canonical target column name used by the multi-seasonal path.
pub const CANONICAL_TARGET: &str = "y";

/// Maps the caller's column names onto the series id, timestamp and value roles.
///
/// The mapping is passed down to the decomposition paths instead of renaming
/// the caller's frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnMapping {
    /// Column identifying each series.
    pub id: String,
    /// Column holding the observation timestamp.
    pub time: String,
    /// Column holding the observed value.
    pub target: String,
}

impl ColumnMapping {
    pub fn new(id: impl Into<String>, time: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time: time.into(),
            target: target.into(),
        }
    }

    /// Column names in (id, time, target) order.
    pub fn columns(&self) -> [&str; 3] {
        [&self.id, &self.time, &self.target]
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::new(CANONICAL_ID, CANONICAL_TIME, CANONICAL_TARGET)
    }
}

/// Decomposition strategy.
///
/// `Mstl` always carries its seasonal periods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DecompositionMode {
    /// Classical moving-average decomposition with the series frequency as period.
    #[default]
    Simple,
    /// Multi-seasonal decomposition over the given periods.
    Mstl { periods: Vec<usize> },
}

impl DecompositionMode {
    /// Create an MSTL mode, rejecting an empty or zero period list.
    pub fn mstl(periods: Vec<usize>) -> Result<Self> {
        if periods.is_empty() {
            return Err(FeatureError::InvalidSeasonalFrequencies(
                "at least one seasonal frequency is required in mstl mode".to_string(),
            ));
        }
        if let Some(&p) = periods.iter().find(|&&p| p == 0) {
            return Err(FeatureError::InvalidSeasonalFrequencies(format!(
                "seasonal frequency {} is not a positive integer",
                p
            )));
        }
        Ok(Self::Mstl { periods })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Mstl { .. } => "mstl",
        }
    }
}

/// Mode tag without payload, as accepted by the dynamic entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Simple,
    Mstl,
}

impl FromStr for ModeKind {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "mstl" => Ok(Self::Mstl),
            _ => Err(FeatureError::InvalidMode(s.to_string())),
        }
    }
}

/// Calendar frequency of a series, required by the multi-seasonal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalendarFrequency {
    Monthly,
    Weekly,
    Quarterly,
    Hourly,
}

impl CalendarFrequency {
    /// Duration token in polars offset notation.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Monthly => "1mo",
            Self::Weekly => "1w",
            Self::Quarterly => "1q",
            Self::Hourly => "1h",
        }
    }

    /// Observations per natural cycle (the `ts_freq` this frequency maps from).
    pub fn observations_per_cycle(&self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Weekly => 52,
            Self::Quarterly => 4,
            Self::Hourly => 24,
        }
    }
}

impl TryFrom<u32> for CalendarFrequency {
    type Error = FeatureError;

    fn try_from(ts_freq: u32) -> Result<Self> {
        match ts_freq {
            12 => Ok(Self::Monthly),
            52 => Ok(Self::Weekly),
            4 => Ok(Self::Quarterly),
            24 => Ok(Self::Hourly),
            other => Err(FeatureError::UnsupportedFrequency(other)),
        }
    }
}

impl fmt::Display for CalendarFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Full parameter set for a feature-extraction call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureParams {
    /// Column roles.
    pub columns: ColumnMapping,
    /// Observations per seasonal cycle; the period of the simple path.
    pub ts_freq: u32,
    /// Decomposition strategy.
    pub mode: DecompositionMode,
    /// Additive or multiplicative model for the simple path.
    pub model: DecompositionModel,
}

impl FeatureParams {
    /// Create parameters for the simple path with an additive model.
    pub fn new(columns: ColumnMapping, ts_freq: u32) -> Self {
        Self {
            columns,
            ts_freq,
            mode: DecompositionMode::Simple,
            model: DecompositionModel::Additive,
        }
    }

    /// Set the decomposition mode.
    pub fn with_mode(mut self, mode: DecompositionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Switch to multi-seasonal decomposition over the given periods.
    pub fn with_seasonal_periods(self, periods: Vec<usize>) -> Result<Self> {
        Ok(self.with_mode(DecompositionMode::mstl(periods)?))
    }

    /// Set the classical decomposition model.
    pub fn with_model(mut self, model: DecompositionModel) -> Self {
        self.model = model;
        self
    }

    /// Calendar frequency for the multi-seasonal path.
    pub fn calendar_frequency(&self) -> Result<CalendarFrequency> {
        CalendarFrequency::try_from(self.ts_freq)
    }
}
