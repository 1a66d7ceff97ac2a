use std::path::PathBuf;
use std::time::Duration;

use polars::prelude::DataFrame;

/// Shape of one table produced during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

impl TableSummary {
    pub fn of(name: &str, frame: &DataFrame) -> Self {
        Self {
            name: name.to_string(),
            rows: frame.height(),
            columns: frame.width(),
        }
    }
}

/// Rows read from each source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractedCounts {
    pub transactions: usize,
    pub customers: usize,
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub environment: String,
    pub extracted: ExtractedCounts,
    pub tables: Vec<TableSummary>,
    pub target_table: String,
    pub loaded_rows: usize,
    pub indexes: Vec<String>,
    pub views: Vec<String>,
    /// Directory holding the audit snapshots, when they were written.
    pub snapshot_dir: Option<PathBuf>,
    pub elapsed: Duration,
}
