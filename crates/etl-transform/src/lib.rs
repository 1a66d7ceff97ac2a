//! Transformation stage.
//!
//! - **datetime**: heterogeneous date parsing into the canonical `DD/MM/YYYY`
//! - **active**: loosely typed `is_active` flags to strict booleans
//! - **customers** / **transactions**: cleaning of the two raw tables
//! - **merge**: inner join and the high-value customer aggregate
//! - **tables**: the whole stage as one call over the raw frames

pub mod active;
pub mod customers;
pub mod datetime;
pub mod merge;
pub mod tables;
pub mod transactions;

pub use active::{ActiveFlag, standardise_is_active};
pub use customers::clean_customers;
pub use datetime::{CANONICAL_DATE_FORMAT, DATE_FORMATS, format_canonical_date, normalize_date};
pub use merge::{aggregate_high_value, clean_high_value, merge_transactions_customers};
pub use tables::{TransformedTables, transform_tables};
pub use transactions::clean_transactions;
