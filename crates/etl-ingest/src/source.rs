//! Source collaborators and timed extraction.

use std::path::PathBuf;
use std::time::Instant;

use etl_model::Result;
use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::csv_table::read_csv_frame;

/// Expected extraction cost for the customer CSV, in seconds per row.
pub const CSV_EXPECTED_SECONDS_PER_ROW: f64 = 0.0001;

/// A tabular source read once per pipeline run.
pub trait TableSource {
    /// Name used in logs and error messages (e.g. `transactions`).
    fn name(&self) -> &str;

    /// Read the whole table.
    fn read(&self) -> Result<DataFrame>;

    /// Extraction slower than this many seconds per row is reported.
    fn expected_seconds_per_row(&self) -> f64 {
        0.001
    }
}

/// Read a source, logging its shape and extraction rate.
pub fn extract_table(source: &dyn TableSource) -> Result<DataFrame> {
    let started = Instant::now();
    let frame = source.read()?;
    let elapsed = started.elapsed().as_secs_f64();
    info!(
        source = source.name(),
        rows = frame.height(),
        columns = frame.width(),
        elapsed_secs = elapsed,
        "extraction successful"
    );
    if frame.height() > 0 {
        let per_row = elapsed / frame.height() as f64;
        let expected = source.expected_seconds_per_row();
        if per_row > expected {
            warn!(
                source = source.name(),
                per_row_secs = per_row,
                expected_secs = expected,
                "extraction time per row exceeds expected rate"
            );
        }
    }
    Ok(frame)
}

/// Customer records from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    name: String,
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl TableSource for CsvFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<DataFrame> {
        read_csv_frame(&self.path, &self.name)
    }

    fn expected_seconds_per_row(&self) -> f64 {
        CSV_EXPECTED_SECONDS_PER_ROW
    }
}
