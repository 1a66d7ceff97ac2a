//! Transaction table cleaning.

use etl_common::{
    PolarsResultExt, any_to_f64, any_to_string, dedupe_rows, filter_rows, is_missing,
    require_column, value_at,
};
use etl_model::schema::{AMOUNT, INVALID_AMOUNT, TRANSACTION_DATE};
use etl_model::{EtlError, Result};
use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::debug;

use crate::datetime::{format_canonical_date, normalize_date};

const STAGE: &str = "clean_transactions";

fn date_text(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(text) => Some(text.to_string()),
        other => Some(any_to_string(other)),
    }
}

/// Clean raw transaction records.
///
/// 1. Drop rows missing `transaction_date` or `amount`.
/// 2. Drop rows whose `amount` is the `INVALID` marker.
/// 3. Normalize `transaction_date` to `DD/MM/YYYY`, dropping unparseable
///    dates.
/// 4. Drop full-row duplicates, keeping the first occurrence.
/// 5. Coerce `amount` to Float64; a non-numeric amount is a schema error.
///
/// Duplicates are removed after date normalization so that the same record
/// written with two date layouts collapses to one row.
pub fn clean_transactions(transactions: &DataFrame) -> Result<DataFrame> {
    let date = require_column(transactions, TRANSACTION_DATE, STAGE)?;
    let amount = require_column(transactions, AMOUNT, STAGE)?;

    let mut missing = 0usize;
    let mut invalid = 0usize;
    let keep: Vec<bool> = (0..transactions.height())
        .map(|idx| {
            let amount_value = value_at(amount, idx);
            if is_missing(&value_at(date, idx)) || is_missing(&amount_value) {
                missing += 1;
                false
            } else if any_to_string(amount_value) == INVALID_AMOUNT {
                invalid += 1;
                false
            } else {
                true
            }
        })
        .collect();
    let mut cleaned = filter_rows(transactions, &keep).in_stage(STAGE)?;

    let dates: Vec<Option<String>> = {
        let column = require_column(&cleaned, TRANSACTION_DATE, STAGE)?;
        (0..cleaned.height())
            .map(|idx| {
                let raw = date_text(value_at(column, idx));
                normalize_date(raw.as_deref()).map(format_canonical_date)
            })
            .collect()
    };
    let parsed: Vec<bool> = dates.iter().map(Option::is_some).collect();
    let unparseable = parsed.iter().filter(|ok| !**ok).count();
    cleaned
        .with_column(Series::new(TRANSACTION_DATE.into(), dates))
        .in_stage(STAGE)?;
    let cleaned = filter_rows(&cleaned, &parsed).in_stage(STAGE)?;

    let (mut cleaned, duplicates) = dedupe_rows(&cleaned).in_stage(STAGE)?;

    let amounts: Vec<f64> = {
        let column = require_column(&cleaned, AMOUNT, STAGE)?;
        (0..cleaned.height())
            .map(|idx| {
                let value = value_at(column, idx);
                any_to_f64(value.clone()).ok_or_else(|| {
                    EtlError::transformation(
                        STAGE,
                        format!(
                            "column `{AMOUNT}` has non-numeric value `{}` at row {idx}",
                            any_to_string(value)
                        ),
                    )
                })
            })
            .collect::<Result<_>>()?
    };
    cleaned
        .with_column(Series::new(AMOUNT.into(), amounts))
        .in_stage(STAGE)?;

    debug!(
        input = transactions.height(),
        missing,
        invalid,
        unparseable,
        duplicates,
        output = cleaned.height(),
        "cleaned transactions"
    );
    Ok(cleaned)
}
