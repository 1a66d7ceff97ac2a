use etl_model::{Result, TransformOptions};
use polars::prelude::DataFrame;
use tracing::info;

use crate::customers::clean_customers;
use crate::merge::{aggregate_high_value, clean_high_value, merge_transactions_customers};
use crate::transactions::clean_transactions;

/// Every table produced by one transformation pass.
#[derive(Debug, Clone)]
pub struct TransformedTables {
    pub cleaned_transactions: DataFrame,
    pub cleaned_customers: DataFrame,
    pub merged: DataFrame,
    pub high_value: DataFrame,
    pub cleaned_high_value: DataFrame,
}

/// Clean both inputs, join them and compute the high-value aggregates.
///
/// The inputs are borrowed and never modified.
pub fn transform_tables(
    transactions: &DataFrame,
    customers: &DataFrame,
    options: &TransformOptions,
) -> Result<TransformedTables> {
    let cleaned_transactions = clean_transactions(transactions)?;
    let cleaned_customers = clean_customers(customers)?;
    let merged = merge_transactions_customers(&cleaned_transactions, &cleaned_customers)?;
    let high_value = aggregate_high_value(&merged, options.high_value_threshold)?;
    let cleaned_high_value = clean_high_value(&high_value)?;
    info!(
        transactions = cleaned_transactions.height(),
        customers = cleaned_customers.height(),
        merged = merged.height(),
        high_value = high_value.height(),
        cleaned_high_value = cleaned_high_value.height(),
        "transformation complete"
    );
    Ok(TransformedTables {
        cleaned_transactions,
        cleaned_customers,
        merged,
        high_value,
        cleaned_high_value,
    })
}
