//! Inner join of transactions to customers and the high-value aggregate.

use etl_common::{PolarsResultExt, column_names, require_column};
use etl_model::Result;
use etl_model::schema::{
    AGE, AMOUNT, AVG_TRANSACTION_VALUE, COUNTRY, CUSTOMER_ATTRIBUTES, CUSTOMER_ID, TOTAL_SPEND,
};
use polars::prelude::{
    DataFrame, DataType, Expr, IntoLazy, JoinArgs, JoinType, MaintainOrderJoin,
    SortMultipleOptions, col, lit,
};
use tracing::debug;

/// Textual join key, so integer and string ids compare by their rendering.
const JOIN_KEY: &str = "__customer_key";
const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

fn join_key() -> Expr {
    col(CUSTOMER_ID).cast(DataType::String).alias(JOIN_KEY)
}

/// Inner-join cleaned transactions to cleaned customers on `customer_id`.
///
/// Transactions without a matching customer are dropped and missing ids
/// never match. Output rows follow transaction order; a transaction matching
/// several customer rows yields one row per match, in customer order.
/// Columns are the transaction columns followed by the customer columns
/// other than the key; a name present on both sides gets a `_x`
/// (transaction) or `_y` (customer) suffix.
pub fn merge_transactions_customers(
    transactions: &DataFrame,
    customers: &DataFrame,
) -> Result<DataFrame> {
    const STAGE: &str = "merge";
    require_column(transactions, CUSTOMER_ID, STAGE)?;
    require_column(customers, CUSTOMER_ID, STAGE)?;

    let left_names = column_names(transactions);
    let right_names: Vec<String> = column_names(customers)
        .into_iter()
        .filter(|name| name != CUSTOMER_ID)
        .collect();
    let mut right_columns = vec![join_key()];
    right_columns.extend(right_names.iter().map(|name| col(name.as_str())));

    let mut args = JoinArgs::new(JoinType::Inner).with_suffix(Some(RIGHT_SUFFIX.into()));
    args.maintain_order = MaintainOrderJoin::LeftRight;
    let mut merged = transactions
        .clone()
        .lazy()
        .with_column(join_key())
        .join(
            customers.clone().lazy().select(right_columns),
            [col(JOIN_KEY)],
            [col(JOIN_KEY)],
            args,
        )
        .collect()
        .in_stage(STAGE)?
        .drop(JOIN_KEY)
        .in_stage(STAGE)?;

    for name in left_names.iter().filter(|name| right_names.contains(name)) {
        merged
            .rename(name, format!("{name}{LEFT_SUFFIX}").into())
            .in_stage(STAGE)?;
    }
    debug!(
        transactions = transactions.height(),
        customers = customers.height(),
        merged = merged.height(),
        "merged transactions with customers"
    );
    Ok(merged)
}

/// Per-customer spend over the merged table, keeping customers whose
/// `total_spend` is strictly greater than `threshold`.
///
/// Output columns: `customer_id`, `total_spend`, `avg_transaction_value`,
/// `name`, `age`, `country`, `is_active`. Customer attributes come from the
/// first merged row of each customer. Rows are ordered by `customer_id`.
/// Missing amounts are skipped by both the sum and the mean.
pub fn aggregate_high_value(merged: &DataFrame, threshold: f64) -> Result<DataFrame> {
    const STAGE: &str = "aggregate_high_value";
    require_column(merged, CUSTOMER_ID, STAGE)?;
    require_column(merged, AMOUNT, STAGE)?;
    for attribute in CUSTOMER_ATTRIBUTES {
        require_column(merged, attribute, STAGE)?;
    }

    let mut aggregations = vec![
        col(AMOUNT).sum().alias(TOTAL_SPEND),
        col(AMOUNT).mean().alias(AVG_TRANSACTION_VALUE),
    ];
    aggregations.extend(CUSTOMER_ATTRIBUTES.map(|attribute| col(attribute).first()));

    let aggregate = merged
        .clone()
        .lazy()
        .with_column(col(AMOUNT).cast(DataType::Float64))
        .group_by_stable([col(CUSTOMER_ID)])
        .agg(aggregations)
        .filter(col(TOTAL_SPEND).gt(lit(threshold)))
        .sort([CUSTOMER_ID], SortMultipleOptions::default())
        .collect()
        .in_stage(STAGE)?;
    debug!(
        merged = merged.height(),
        high_value = aggregate.height(),
        threshold,
        "aggregated high-value customers"
    );
    Ok(aggregate)
}

/// Drop aggregate rows missing `age` or `country`.
pub fn clean_high_value(aggregate: &DataFrame) -> Result<DataFrame> {
    const STAGE: &str = "clean_high_value";
    require_column(aggregate, AGE, STAGE)?;
    require_column(aggregate, COUNTRY, STAGE)?;
    aggregate
        .clone()
        .lazy()
        .filter(col(AGE).is_not_null().and(col(COUNTRY).is_not_null()))
        .collect()
        .in_stage(STAGE)
}
