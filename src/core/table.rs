//! Polars plumbing: splitting the input frame into per-series values and
//! stacking per-series feature rows back into a frame.

use super::params::ColumnMapping;
use crate::error::Result;
use polars::prelude::*;

/// One series pulled out of the input frame.
#[derive(Debug, Clone)]
pub struct SeriesGroup {
    /// One-row frame holding the id column with the caller's name and dtype.
    pub key: DataFrame,
    /// Target values ordered by timestamp; `None` for nulls.
    pub values: Vec<Option<f64>>,
}

impl SeriesGroup {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split `df` by the id column, in order of first appearance, with each
/// series sorted by its timestamp column.
pub fn partition_series(df: &DataFrame, columns: &ColumnMapping) -> Result<Vec<SeriesGroup>> {
    let parts = df.partition_by_stable([columns.id.as_str()], true)?;

    parts
        .into_iter()
        .map(|part| {
            let part = part.sort(
                [columns.time.as_str()],
                SortMultipleOptions::new().with_maintain_order(true),
            )?;
            let key = part.select([columns.id.as_str()])?.head(Some(1));
            let values = float_values(&part, &columns.target)?;
            Ok(SeriesGroup { key, values })
        })
        .collect()
}

/// Column `name` cast to `Float64`.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

/// Display label of a group key, `None` for a null id.
pub fn key_label(key: &DataFrame, id: &str) -> Result<Option<String>> {
    let series = key
        .column(id)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let label = series.str()?.get(0).map(str::to_string);
    Ok(label)
}

/// Append named `Float64` values to a one-row key frame.
pub fn feature_row(key: &DataFrame, values: &[(String, Option<f64>)]) -> Result<DataFrame> {
    let columns: Vec<Column> = values
        .iter()
        .map(|(name, value)| Series::new(name.as_str().into(), &[*value]).into())
        .collect();
    Ok(key.hstack(&columns)?)
}

/// Stack rows sharing one schema.
pub fn stack_rows(rows: Vec<DataFrame>) -> Result<DataFrame> {
    let mut rows = rows.into_iter();
    let Some(mut out) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    for row in rows {
        out.vstack_mut(&row)?;
    }
    Ok(out)
}
