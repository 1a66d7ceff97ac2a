use std::fs;
use std::path::PathBuf;

use etl_common::{any_to_string, value_at};
use etl_ingest::{CsvFileSource, TableSource, extract_table, read_csv_frame};
use polars::prelude::DataType;
use tempfile::TempDir;

fn temp_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_customers_with_inferred_types() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(
        &dir,
        "customers.csv",
        "\u{feff}customer_id, name ,age,country,is_active\n\
         1,Alice,30,uk,active\n\
         2,Bob,,usa,0\n\
         \n\
         3,Carol,41,France,True\n",
    );
    let frame = read_csv_frame(&path, "customers").expect("read csv");

    assert_eq!(frame.height(), 3);
    assert_eq!(
        etl_common::column_names(&frame),
        vec!["customer_id", "name", "age", "country", "is_active"]
    );
    assert_eq!(frame.column("customer_id").unwrap().dtype(), &DataType::Int64);
    assert_eq!(frame.column("age").unwrap().dtype(), &DataType::Int64);
    assert_eq!(frame.column("age").unwrap().null_count(), 1);
    assert_eq!(frame.column("is_active").unwrap().dtype(), &DataType::String);
    let flags = frame.column("is_active").unwrap();
    assert_eq!(any_to_string(value_at(flags, 1)), "0");
    assert_eq!(any_to_string(value_at(flags, 2)), "true");
}

#[test]
fn short_rows_are_padded_with_nulls() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(&dir, "short.csv", "a,b,c\n1,x\n");
    let frame = read_csv_frame(&path, "customers").expect("read csv");
    assert_eq!(frame.height(), 1);
    assert_eq!(frame.column("c").unwrap().null_count(), 1);
}

#[test]
fn long_rows_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(&dir, "long.csv", "a,b\n1,2,3\n");
    let error = read_csv_frame(&path, "customers").unwrap_err();
    assert!(error.to_string().contains("has 3 fields, header has 2"));
}

#[test]
fn missing_file_is_an_extraction_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = CsvFileSource::new("customers", dir.path().join("absent.csv"));
    let error = extract_table(&source).unwrap_err();
    assert_eq!(error.phase(), "extract");
    assert!(error.to_string().starts_with("failed to extract customers: read csv"));
}

#[test]
fn empty_file_has_no_header() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(&dir, "empty.csv", "");
    let error = read_csv_frame(&path, "customers").unwrap_err();
    assert!(error.to_string().contains("no header row"));
}

#[test]
fn csv_source_reports_its_name() {
    let source = CsvFileSource::new("customers", "data/raw/unclean_customers.csv");
    assert_eq!(source.name(), "customers");
    assert!(source.expected_seconds_per_row() < 0.001);
}
