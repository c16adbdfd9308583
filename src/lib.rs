//! # seasonal-features
//!
//! Trend strength, seasonal strength and residual variance features for
//! tables of many time series.
//!
//! Every series in a polars `DataFrame` (identified by an id column, ordered by
//! a time column) is decomposed into trend, seasonal and residual components,
//! either with classical moving-average decomposition or with MSTL over
//! several seasonal periods, and summarised into one feature row per series.
//!
//! ```
//! use polars::prelude::*;
//! use seasonal_features::seasonal_decompose_features;
//!
//! let ids: Vec<&str> = (0..48).map(|i| if i < 24 { "A" } else { "B" }).collect();
//! let t: Vec<i64> = (0..48).map(|i| i % 24).collect();
//! let y: Vec<f64> = (0..48).map(|i| 20.0 + (i % 24) as f64 + [2.0, -2.0][i % 2]).collect();
//! let df = df!("id" => ids, "t" => t, "y" => y).unwrap();
//!
//! let features = seasonal_decompose_features(&df, "id", "t", "y", 4, None, "simple").unwrap();
//! assert_eq!(features.height(), 2);
//! ```

pub mod core;
pub mod error;
pub mod features;
pub mod seasonality;
pub mod utils;
pub mod validation;

pub use error::{DecomposeError, FeatureError, Result};
pub use features::seasonal_decompose_features;

pub mod prelude {
    pub use crate::core::{CalendarFrequency, ColumnMapping, DecompositionMode, FeatureParams};
    pub use crate::error::{DecomposeError, FeatureError, Result};
    pub use crate::features::{seasonal_decompose_features, FeatureExtractor, SeriesFeatures};
    pub use crate::seasonality::{
        ClassicalDecomposition, DecompositionModel, MultiSeasonalDecomposer, SeasonalDecomposer,
        MSTL,
    };
}
