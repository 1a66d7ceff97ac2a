//! Row-level helpers over Polars frames.
//!
//! The cleaning stages build a keep-mask and filter, so the order of the
//! source rows is always preserved.

use etl_model::{EtlError, Result};
use polars::prelude::{
    AnyValue, BooleanChunked, Column, DataFrame, NewChunkedArray, PolarsResult, UniqueKeepStrategy,
};

/// Maps Polars failures onto the transformation error of a named stage.
pub trait PolarsResultExt<T> {
    fn in_stage(self, stage: &str) -> Result<T>;
}

impl<T> PolarsResultExt<T> for PolarsResult<T> {
    fn in_stage(self, stage: &str) -> Result<T> {
        self.map_err(|error| EtlError::transformation(stage, error))
    }
}

/// Look up a column, reporting its absence as a schema violation of `stage`.
pub fn require_column<'a>(df: &'a DataFrame, name: &str, stage: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| EtlError::transformation(stage, format!("missing column `{name}`")))
}

/// Value at `idx`, treating out-of-range access as null.
pub fn value_at(column: &Column, idx: usize) -> AnyValue<'_> {
    column.get(idx).unwrap_or(AnyValue::Null)
}

/// Null, or a floating-point NaN.
pub fn is_missing(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float64(v) => v.is_nan(),
        AnyValue::Float32(v) => v.is_nan(),
        _ => false,
    }
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

/// Keep the rows whose mask entry is `true`, preserving order.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    df.filter(&mask)
}

/// Remove full-row duplicates, keeping the first occurrence of each row.
///
/// Returns the deduplicated frame and the number of rows removed.
pub fn dedupe_rows(df: &DataFrame) -> PolarsResult<(DataFrame, usize)> {
    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let removed = df.height() - deduped.height();
    Ok((deduped, removed))
}
