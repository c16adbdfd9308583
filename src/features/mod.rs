//! Decomposition features for grouped time series.
//!
//! - [`strength`]: trend/seasonal strength and residual variance ratio of one
//!   decomposed series
//! - [`assembler`]: runs validation, decomposition and measurement over every
//!   series of a frame

pub mod assembler;
pub mod strength;

pub use assembler::{
    seasonal_decompose_features, FeatureExtractor, SeriesFeatures, RESID_VAR, SEASONAL_STRENGTH,
    TREND_STRENGTH,
};
pub use strength::{ComponentStrength, StrengthMetrics};
