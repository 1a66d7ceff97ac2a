//! Query-backed source over a SQLite database.

use std::path::{Path, PathBuf};

use etl_common::read_sql_file;
use etl_model::{EtlError, Result};
use polars::prelude::DataFrame;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::cell::{Cell, frame_from_cells};
use crate::source::TableSource;

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Int(v),
            ValueRef::Real(v) => Cell::Float(v),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Cell::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Runs one query against a read-only connection and returns its rows.
///
/// The database file must already exist; a connection is opened per read and
/// closed when the read finishes.
#[derive(Debug, Clone)]
pub struct SqliteQuerySource {
    name: String,
    db_path: PathBuf,
    query: String,
}

impl SqliteQuerySource {
    pub fn new(name: impl Into<String>, db_path: impl Into<PathBuf>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_path: db_path.into(),
            query: query.into(),
        }
    }

    /// Build a source whose query is read from a SQL file.
    pub fn from_sql_file(
        name: impl Into<String>,
        db_path: impl Into<PathBuf>,
        sql_path: &Path,
    ) -> Result<Self> {
        let name = name.into();
        let query = read_sql_file(sql_path).map_err(|error| {
            EtlError::extraction(
                name.as_str(),
                format!("import query {}: {error}", sql_path.display()),
            )
        })?;
        debug!(path = %sql_path.display(), "imported query");
        Ok(Self::new(name, db_path, query))
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn fail(&self, error: &rusqlite::Error) -> EtlError {
        EtlError::extraction(
            self.name.as_str(),
            format!(
                "{error} (database {}, query `{}`)",
                self.db_path.display(),
                self.query
            ),
        )
    }
}

impl TableSource for SqliteQuerySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<DataFrame> {
        let connection = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|error| self.fail(&error))?;
        let mut statement = connection
            .prepare(&self.query)
            .map_err(|error| self.fail(&error))?;
        let headers: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        let mut rows = statement.query([]).map_err(|error| self.fail(&error))?;
        while let Some(row) = rows.next().map_err(|error| self.fail(&error))? {
            for (idx, cells) in columns.iter_mut().enumerate() {
                let value = row.get_ref(idx).map_err(|error| self.fail(&error))?;
                cells.push(Cell::from(value));
            }
        }
        frame_from_cells(&headers, &columns)
            .map_err(|error| EtlError::extraction(self.name.as_str(), error))
    }
}
