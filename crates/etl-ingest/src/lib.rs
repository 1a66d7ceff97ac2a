//! Extraction stage.
//!
//! Sources turn raw records into Polars frames. Every raw value passes
//! through [`Cell`] so that column types are decided once, at this boundary,
//! and the cleaning stages see consistently typed columns.

pub mod cell;
pub mod csv_table;
pub mod source;
pub mod sqlite;

pub use cell::{Cell, build_column, frame_from_cells};
pub use csv_table::read_csv_frame;
pub use source::{CsvFileSource, TableSource, extract_table};
pub use sqlite::SqliteQuerySource;
