//! Core parameter types and series-table plumbing.

mod params;
pub mod table;

pub use params::{
    CalendarFrequency, ColumnMapping, DecompositionMode, FeatureParams, ModeKind, CANONICAL_ID,
    CANONICAL_TARGET, CANONICAL_TIME,
};
pub use table::SeriesGroup;
