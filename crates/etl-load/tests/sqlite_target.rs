//! Tests for the SQLite target: table writes, indexes and views.

use std::fs;
use std::path::Path;

use etl_load::{Enrichment, SqliteTarget, TableSink};
use etl_model::{LoadOptions, WriteMode};
use polars::prelude::*;
use tempfile::TempDir;

fn merged(ids: &[i64], customers: &[i64], amounts: &[f64]) -> DataFrame {
    DataFrame::new(vec![
        Series::new("transaction_id".into(), ids.to_vec()).into(),
        Series::new("customer_id".into(), customers.to_vec()).into(),
        Series::new("transaction_date".into(), vec!["01/01/2021"; ids.len()]).into(),
        Series::new("amount".into(), amounts.to_vec()).into(),
        Series::new("name".into(), vec!["Ann"; ids.len()]).into(),
        Series::new("age".into(), vec![Some(30i64); ids.len()]).into(),
        Series::new("country".into(), vec!["UK"; ids.len()]).into(),
        Series::new("is_active".into(), vec![true; ids.len()]).into(),
    ])
    .unwrap()
}

fn write_sql_dir(root: &Path) {
    let indexes = root.join("indexes");
    fs::create_dir_all(&indexes).unwrap();
    fs::write(
        indexes.join("01_customer_id.sql"),
        "CREATE INDEX IF NOT EXISTS idx_tbc_customer_id\nON transactions_by_customers (customer_id);\n",
    )
    .unwrap();
    fs::write(
        indexes.join("02_transaction_date.sql"),
        "CREATE INDEX IF NOT EXISTS idx_tbc_transaction_date\nON transactions_by_customers (transaction_date);\n",
    )
    .unwrap();
    fs::write(
        root.join("high_value_customers_view.sql"),
        "DROP VIEW IF EXISTS high_value_customers;\n\
         CREATE VIEW high_value_customers AS\n\
         SELECT customer_id, SUM(amount) AS total_spend\n\
         FROM transactions_by_customers\n\
         GROUP BY customer_id\n\
         HAVING SUM(amount) > :total_spend_threshold;\n",
    )
    .unwrap();
    fs::write(
        root.join("high_value_customers_cleaned_view.sql"),
        "DROP VIEW IF EXISTS high_value_customers_cleaned;\n\
         CREATE VIEW high_value_customers_cleaned AS\n\
         SELECT customer_id, SUM(amount) AS total_spend\n\
         FROM transactions_by_customers\n\
         WHERE age IS NOT NULL AND country IS NOT NULL\n\
         GROUP BY customer_id\n\
         HAVING SUM(amount) > :total_spend_threshold;\n",
    )
    .unwrap();
}

fn count(target: &SqliteTarget, sql: &str) -> i64 {
    target
        .connection()
        .query_row(sql, [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_replace_recreates_table() {
    let dir = TempDir::new().unwrap();
    let mut target = SqliteTarget::open(dir.path().join("target.db"), dir.path()).unwrap();

    let written = target
        .write_table("transactions_by_customers", &merged(&[1, 2, 3], &[1, 1, 2], &[1.0, 2.0, 3.0]), &WriteMode::Replace)
        .unwrap();
    assert_eq!(written, 3);
    target
        .write_table("transactions_by_customers", &merged(&[9], &[4], &[7.5]), &WriteMode::Replace)
        .unwrap();

    assert_eq!(count(&target, "SELECT COUNT(*) FROM transactions_by_customers"), 1);
    let amount: f64 = target
        .connection()
        .query_row("SELECT amount FROM transactions_by_customers", [], |row| row.get(0))
        .unwrap();
    assert_eq!(amount, 7.5);
}

#[test]
fn test_upsert_updates_on_conflict() {
    let dir = TempDir::new().unwrap();
    let mut target = SqliteTarget::open(dir.path().join("target.db"), dir.path()).unwrap();
    let mode = WriteMode::upsert_merged();

    target
        .write_table("transactions_by_customers", &merged(&[1, 2], &[1, 1], &[10.0, 20.0]), &mode)
        .unwrap();
    target
        .write_table("transactions_by_customers", &merged(&[2, 3], &[1, 2], &[25.0, 30.0]), &mode)
        .unwrap();

    assert_eq!(count(&target, "SELECT COUNT(*) FROM transactions_by_customers"), 3);
    let amount: f64 = target
        .connection()
        .query_row(
            "SELECT amount FROM transactions_by_customers WHERE transaction_id = 2",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(amount, 25.0);
}

#[test]
fn test_upsert_requires_key_column() {
    let dir = TempDir::new().unwrap();
    let mut target = SqliteTarget::open(dir.path().join("target.db"), dir.path()).unwrap();
    let frame = merged(&[1], &[1], &[1.0]).drop("transaction_id").unwrap();

    let error = target
        .write_table("transactions_by_customers", &frame, &WriteMode::upsert_merged())
        .unwrap_err();
    assert_eq!(error.phase(), "load");
    assert!(error.to_string().contains("upsert key column `transaction_id`"));
}

#[test]
fn test_open_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("nested").join("target.db");
    SqliteTarget::open(&db, dir.path()).unwrap();
    assert!(db.exists());
}

#[test]
fn test_indexes_apply_in_file_order() {
    let dir = TempDir::new().unwrap();
    write_sql_dir(dir.path());
    let mut target = SqliteTarget::open(dir.path().join("target.db"), dir.path()).unwrap();
    target
        .write_table("transactions_by_customers", &merged(&[1], &[1], &[1.0]), &WriteMode::Replace)
        .unwrap();

    let applied = target.apply_indexes().unwrap();
    assert_eq!(applied, vec!["01_customer_id.sql", "02_transaction_date.sql"]);
    assert_eq!(
        count(&target, "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_tbc_%'"),
        2
    );
    // Index definitions are idempotent.
    target.apply_indexes().unwrap();
}

#[test]
fn test_index_failure_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    write_sql_dir(dir.path());
    let mut target = SqliteTarget::open(dir.path().join("target.db"), dir.path()).unwrap();

    // No table to index yet.
    let error = target.apply_indexes().unwrap_err();
    assert_eq!(error.phase(), "load");
    assert!(error.to_string().contains("01_customer_id.sql"));
}

#[test]
fn test_views_filter_on_threshold() {
    let dir = TempDir::new().unwrap();
    write_sql_dir(dir.path());
    let mut target = SqliteTarget::open(dir.path().join("target.db"), dir.path()).unwrap();
    target
        .write_table(
            "transactions_by_customers",
            &merged(&[1, 2, 3], &[1, 1, 2], &[300.0, 300.0, 500.0]),
            &WriteMode::Replace,
        )
        .unwrap();

    let params = LoadOptions::default().view_params();
    let views = target.create_views(&params).unwrap();
    assert_eq!(
        views,
        vec![
            "high_value_customers_view.sql",
            "high_value_customers_cleaned_view.sql"
        ]
    );
    assert_eq!(count(&target, "SELECT COUNT(*) FROM high_value_customers"), 1);
    assert_eq!(count(&target, "SELECT customer_id FROM high_value_customers_cleaned"), 1);

    // Re-running replaces the views with the new threshold.
    let params = LoadOptions::default().with_threshold(100.0).view_params();
    target.create_views(&params).unwrap();
    assert_eq!(count(&target, "SELECT COUNT(*) FROM high_value_customers"), 2);
}

#[test]
fn test_missing_view_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let mut target = SqliteTarget::open(dir.path().join("target.db"), dir.path()).unwrap();

    let error = target
        .create_views(&LoadOptions::default().view_params())
        .unwrap_err();
    assert!(error.to_string().contains("high_value_customers_view.sql"));
}
