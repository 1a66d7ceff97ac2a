use std::path::Path;

use csv::ReaderBuilder;
use etl_model::{EtlError, Result};
use polars::prelude::DataFrame;

use crate::cell::{Cell, frame_from_cells};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Read a CSV file with a header row into a typed frame.
///
/// Blank lines are skipped and short rows are padded with nulls. Column
/// types are inferred per column (see [`crate::build_column`]).
pub fn read_csv_frame(path: &Path, source_name: &str) -> Result<DataFrame> {
    let fail = |message: String| EtlError::extraction(source_name, message);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|error| fail(format!("read csv {}: {error}", path.display())))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| fail(format!("read header {}: {error}", path.display())))?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(fail(format!("no header row in {}", path.display())));
    }
    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|error| {
            fail(format!("read record {} of {}: {error}", line + 1, path.display()))
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        if record.len() > headers.len() {
            return Err(fail(format!(
                "record {} of {} has {} fields, header has {}",
                line + 1,
                path.display(),
                record.len(),
                headers.len()
            )));
        }
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(record.get(idx).map_or(Cell::Null, Cell::infer));
        }
    }
    frame_from_cells(&headers, &columns)
        .map_err(|error| fail(format!("build frame from {}: {error}", path.display())))
}
