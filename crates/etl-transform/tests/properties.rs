//! Property tests for the cleaning and join invariants.

use std::collections::HashSet;

use etl_common::{any_to_string, value_at};
use etl_transform::{clean_customers, clean_transactions, merge_transactions_customers};
use polars::prelude::*;
use proptest::prelude::*;

const DATES: [&str; 6] = [
    "2021/01/01",
    "01-02-2021",
    "01 Jan 2021",
    "Jan 02, 2021",
    "2021-02-30",
    "garbage",
];
const AMOUNTS: [&str; 5] = ["600", "12.5", "INVALID", "0", "499.99"];
const COUNTRIES: [&str; 4] = ["uk", "UK", "fr", "De"];
const FLAGS: [&str; 6] = ["active", "inactive", "1", "0", "True", "false"];

fn transaction_rows() -> impl Strategy<Value = Vec<(i64, i64, Option<usize>, Option<usize>)>> {
    prop::collection::vec(
        (
            0i64..6,
            0i64..4,
            prop::option::of(0..DATES.len()),
            prop::option::of(0..AMOUNTS.len()),
        ),
        0..24,
    )
}

fn customer_rows() -> impl Strategy<Value = Vec<(i64, Option<usize>, Option<usize>)>> {
    prop::collection::vec(
        (
            0i64..5,
            prop::option::of(0..COUNTRIES.len()),
            prop::option::of(0..FLAGS.len()),
        ),
        0..12,
    )
}

fn transactions_frame(rows: &[(i64, i64, Option<usize>, Option<usize>)]) -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            "transaction_id".into(),
            rows.iter().map(|row| row.0).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "customer_id".into(),
            rows.iter().map(|row| row.1).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "transaction_date".into(),
            rows.iter().map(|row| row.2.map(|i| DATES[i])).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "amount".into(),
            rows.iter().map(|row| row.3.map(|i| AMOUNTS[i])).collect::<Vec<_>>(),
        )
        .into(),
    ])
    .unwrap()
}

fn customers_frame(rows: &[(i64, Option<usize>, Option<usize>)]) -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            "customer_id".into(),
            rows.iter().map(|row| row.0).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "name".into(),
            rows.iter().map(|row| format!("c{}", row.0)).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "country".into(),
            rows.iter().map(|row| row.1.map(|i| COUNTRIES[i])).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "is_active".into(),
            rows.iter().map(|row| row.2.map(|i| FLAGS[i])).collect::<Vec<_>>(),
        )
        .into(),
    ])
    .unwrap()
}

fn has_duplicates(df: &DataFrame) -> bool {
    df.is_duplicated().unwrap().any()
}

fn has_nulls(df: &DataFrame, columns: &[&str]) -> bool {
    columns
        .iter()
        .any(|name| df.column(name).unwrap().null_count() > 0)
}

proptest! {
    #[test]
    fn cleaned_transactions_are_idempotent_and_complete(rows in transaction_rows()) {
        let once = clean_transactions(&transactions_frame(&rows)).unwrap();
        let twice = clean_transactions(&once).unwrap();

        prop_assert!(once.equals_missing(&twice));
        prop_assert!(!has_duplicates(&once));
        prop_assert!(!has_nulls(&once, &["transaction_date", "amount"]));
        let amounts = once.column("amount").unwrap();
        prop_assert_eq!(amounts.dtype(), &DataType::Float64);
    }

    #[test]
    fn cleaned_customers_are_idempotent_and_complete(rows in customer_rows()) {
        let once = clean_customers(&customers_frame(&rows)).unwrap();
        let twice = clean_customers(&once).unwrap();

        prop_assert!(once.equals_missing(&twice));
        prop_assert!(!has_duplicates(&once));
        prop_assert!(!has_nulls(&once, &["country", "is_active"]));
        let country = once.column("country").unwrap().str().unwrap();
        for value in country.into_no_null_iter() {
            prop_assert_eq!(value.to_uppercase(), value);
        }
    }

    #[test]
    fn merged_rows_reference_known_customers(
        tx_rows in transaction_rows(),
        raw_customers in customer_rows(),
    ) {
        let transactions = clean_transactions(&transactions_frame(&tx_rows)).unwrap();
        // Unique ids keep the cardinality bound meaningful.
        let mut seen = HashSet::new();
        let unique: Vec<_> = raw_customers
            .into_iter()
            .filter(|row| seen.insert(row.0))
            .collect();
        let customers = clean_customers(&customers_frame(&unique)).unwrap();

        let merged = merge_transactions_customers(&transactions, &customers).unwrap();

        let known: HashSet<String> = (0..customers.height())
            .map(|idx| any_to_string(value_at(customers.column("customer_id").unwrap(), idx)))
            .collect();
        let merged_ids = merged.column("customer_id").unwrap();
        for idx in 0..merged.height() {
            prop_assert!(known.contains(&any_to_string(value_at(merged_ids, idx))));
        }
        prop_assert!(merged.height() <= transactions.height());
    }
}
