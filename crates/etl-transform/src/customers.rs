//! Customer table cleaning.

use etl_common::{
    PolarsResultExt, any_to_string, dedupe_rows, filter_rows, is_missing, require_column,
    value_at,
};
use etl_model::Result;
use etl_model::schema::{COUNTRY, IS_ACTIVE};
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::debug;

use crate::active::standardise_is_active;

const STAGE: &str = "clean_customers";

/// Clean raw customer records.
///
/// 1. Drop rows missing `country` or `is_active`.
/// 2. Uppercase `country`.
/// 3. Normalize `is_active` (see [`standardise_is_active`]) into a Boolean
///    column.
/// 4. Drop full-row duplicates, keeping the first occurrence.
///
/// Other columns pass through untouched and row order is preserved.
pub fn clean_customers(customers: &DataFrame) -> Result<DataFrame> {
    let country = require_column(customers, COUNTRY, STAGE)?;
    let is_active = require_column(customers, IS_ACTIVE, STAGE)?;

    let keep: Vec<bool> = (0..customers.height())
        .map(|idx| {
            !is_missing(&value_at(country, idx)) && !is_missing(&value_at(is_active, idx))
        })
        .collect();
    let mut cleaned = filter_rows(customers, &keep).in_stage(STAGE)?;
    let missing = customers.height() - cleaned.height();

    let countries: Vec<String> = {
        let column = require_column(&cleaned, COUNTRY, STAGE)?;
        (0..cleaned.height())
            .map(|idx| any_to_string(value_at(column, idx)).to_uppercase())
            .collect()
    };
    let flags: Vec<bool> = {
        let column = require_column(&cleaned, IS_ACTIVE, STAGE)?;
        (0..cleaned.height())
            .map(|idx| standardise_is_active(value_at(column, idx)))
            .collect()
    };
    cleaned
        .with_column(Series::new(COUNTRY.into(), countries))
        .in_stage(STAGE)?;
    cleaned
        .with_column(Series::new(IS_ACTIVE.into(), flags))
        .in_stage(STAGE)?;

    let (cleaned, duplicates) = dedupe_rows(&cleaned).in_stage(STAGE)?;
    debug!(
        input = customers.height(),
        missing, duplicates,
        output = cleaned.height(),
        "cleaned customers"
    );
    Ok(cleaned)
}
