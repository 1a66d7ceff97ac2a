//! CSV audit snapshots of the intermediate tables.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use etl_common::{any_to_string, column_names, sha256_hex, value_at};
use etl_model::{EtlError, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const MANIFEST_FILE: &str = "manifest.json";

/// One written snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub file: String,
    pub rows: usize,
    pub columns: usize,
    pub sha256: String,
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub environment: String,
    pub high_value_threshold: f64,
    /// RFC 3339 UTC timestamp.
    pub generated_at: String,
    pub snapshots: Vec<SnapshotEntry>,
}

/// Writes frames as `<name>.csv` into a fixed directory, replacing earlier
/// files of the same name.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

fn io_error(path: &Path, error: impl ToString) -> EtlError {
    EtlError::load(path.display().to_string(), error)
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render a frame as CSV: a header row, then one record per row with
    /// nulls as empty fields.
    pub fn render_csv(frame: &DataFrame) -> std::result::Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(column_names(frame))?;
        let columns = frame.get_columns();
        for idx in 0..frame.height() {
            writer.write_record(
                columns
                    .iter()
                    .map(|column| any_to_string(value_at(column, idx))),
            )?;
        }
        writer
            .into_inner()
            .map_err(|error| csv::Error::from(error.into_error()))
    }

    /// Write one snapshot, returning its manifest entry.
    pub fn write(&self, name: &str, frame: &DataFrame) -> Result<SnapshotEntry> {
        fs::create_dir_all(&self.dir).map_err(|error| io_error(&self.dir, error))?;
        let file = format!("{name}.csv");
        let path = self.dir.join(&file);
        let bytes = Self::render_csv(frame).map_err(|error| io_error(&path, error))?;
        fs::write(&path, &bytes).map_err(|error| io_error(&path, error))?;
        debug!(path = %path.display(), rows = frame.height(), "snapshot written");
        Ok(SnapshotEntry {
            name: name.to_string(),
            file,
            rows: frame.height(),
            columns: frame.width(),
            sha256: sha256_hex(&bytes),
        })
    }

    /// Write every table and the manifest describing them.
    pub fn write_all(
        &self,
        tables: &[(&str, &DataFrame)],
        environment: &str,
        high_value_threshold: f64,
    ) -> Result<SnapshotManifest> {
        let snapshots = tables
            .iter()
            .map(|(name, frame)| self.write(name, frame))
            .collect::<Result<Vec<_>>>()?;
        let manifest = SnapshotManifest {
            environment: environment.to_string(),
            high_value_threshold,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            snapshots,
        };
        let path = self.dir.join(MANIFEST_FILE);
        let json =
            serde_json::to_string_pretty(&manifest).map_err(|error| io_error(&path, error))?;
        fs::write(&path, json).map_err(|error| io_error(&path, error))?;
        info!(
            dir = %self.dir.display(),
            files = manifest.snapshots.len(),
            "snapshots written"
        );
        Ok(manifest)
    }
}
