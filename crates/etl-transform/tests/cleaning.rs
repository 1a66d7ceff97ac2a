//! Tests for customer and transaction cleaning.

use etl_transform::{clean_customers, clean_transactions};
use polars::prelude::*;

fn customers() -> DataFrame {
    DataFrame::new(vec![
        Series::new("customer_id".into(), vec![1i64, 2, 3, 4, 1]).into(),
        Series::new("name".into(), vec!["Ann", "Bob", "Cy", "Di", "Ann"]).into(),
        Series::new("age".into(), vec![Some(30i64), None, Some(41), Some(25), Some(30)]).into(),
        Series::new(
            "country".into(),
            vec![Some("uk"), Some("Fr"), None, Some("de"), Some("UK")],
        )
        .into(),
        Series::new(
            "is_active".into(),
            vec![Some("active"), Some("0"), Some("1"), None, Some("True")],
        )
        .into(),
    ])
    .unwrap()
}

fn transactions() -> DataFrame {
    DataFrame::new(vec![
        Series::new("transaction_id".into(), vec![1i64, 2, 3, 4, 5, 6, 1]).into(),
        Series::new("customer_id".into(), vec![1i64, 1, 2, 2, 3, 3, 1]).into(),
        Series::new(
            "transaction_date".into(),
            vec![
                Some("2021/01/01"),
                None,
                Some("01 Jan 2021"),
                Some("not a date"),
                Some("2021-01-05"),
                Some("Jan 06, 2021"),
                Some("01/01/2021"),
            ],
        )
        .into(),
        Series::new(
            "amount".into(),
            vec![
                Some("600"),
                Some("12.5"),
                Some("INVALID"),
                Some("40"),
                None,
                Some("99.99"),
                Some("600"),
            ],
        )
        .into(),
    ])
    .unwrap()
}

#[test]
fn test_clean_customers_drops_missing_and_normalizes() {
    let cleaned = clean_customers(&customers()).unwrap();

    // Row 3 lacks country, row 4 lacks is_active; row 5 duplicates row 1
    // once country and is_active are normalized.
    assert_eq!(cleaned.height(), 2);
    let country = cleaned.column("country").unwrap().str().unwrap();
    assert_eq!(country.get(0), Some("UK"));
    assert_eq!(country.get(1), Some("FR"));
    let active = cleaned.column("is_active").unwrap().bool().unwrap();
    assert_eq!(active.get(0), Some(true));
    assert_eq!(active.get(1), Some(false));
    // Other columns pass through, missing age included.
    let age = cleaned.column("age").unwrap().i64().unwrap();
    assert_eq!(age.get(1), None);
}

#[test]
fn test_clean_customers_requires_country() {
    let df = customers().drop("country").unwrap();
    let error = clean_customers(&df).unwrap_err();
    assert_eq!(error.phase(), "transform");
    assert!(error.to_string().contains("`country`"));
}

#[test]
fn test_clean_customers_handles_empty_frame() {
    let df = customers().head(Some(0));
    let cleaned = clean_customers(&df).unwrap();
    assert_eq!(cleaned.height(), 0);
    assert_eq!(cleaned.width(), 5);
}

#[test]
fn test_clean_transactions_pipeline_order() {
    let cleaned = clean_transactions(&transactions()).unwrap();

    // Dropped: missing date (2), INVALID (3), bad date (4), missing amount
    // (5) and row 7, which equals row 1 once its date is normalized.
    let ids = cleaned.column("transaction_id").unwrap().i64().unwrap();
    assert_eq!(ids.into_no_null_iter().collect::<Vec<_>>(), vec![1, 6]);

    let dates = cleaned.column("transaction_date").unwrap().str().unwrap();
    assert_eq!(dates.get(0), Some("01/01/2021"));
    assert_eq!(dates.get(1), Some("06/01/2021"));

    let amounts = cleaned.column("amount").unwrap();
    assert_eq!(amounts.dtype(), &DataType::Float64);
    assert_eq!(amounts.f64().unwrap().get(1), Some(99.99));
}

#[test]
fn test_clean_transactions_rejects_non_numeric_amount() {
    let df = DataFrame::new(vec![
        Series::new("transaction_id".into(), vec![1i64]).into(),
        Series::new("customer_id".into(), vec![1i64]).into(),
        Series::new("transaction_date".into(), vec!["2021/01/01"]).into(),
        Series::new("amount".into(), vec!["twelve"]).into(),
    ])
    .unwrap();

    let error = clean_transactions(&df).unwrap_err();
    assert_eq!(
        error.to_string(),
        "transformation failed in clean_transactions: column `amount` has non-numeric value `twelve` at row 0"
    );
}

#[test]
fn test_clean_transactions_requires_amount() {
    let df = transactions().drop("amount").unwrap();
    let error = clean_transactions(&df).unwrap_err();
    assert!(error.to_string().contains("missing column `amount`"));
}

#[test]
fn test_cleaning_does_not_mutate_input() {
    let raw = transactions();
    let before = raw.clone();
    clean_transactions(&raw).unwrap();
    assert!(raw.equals_missing(&before));
}
