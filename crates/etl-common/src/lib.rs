//! Shared utilities for the ETL crates.
//!
//! Polars `AnyValue` conversions, row-level frame helpers used by the
//! cleaning stages, SQL file loading, and content hashing for audit
//! manifests.

pub mod frame;
pub mod hash;
pub mod sql;
pub mod values;

pub use frame::{
    PolarsResultExt, column_names, dedupe_rows, filter_rows, is_missing, require_column,
    value_at,
};
pub use hash::sha256_hex;
pub use sql::{list_sql_files, read_sql_file};
pub use values::{any_to_f64, any_to_string, format_numeric, parse_f64};
