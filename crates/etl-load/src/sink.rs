//! Table writes against a SQLite target database.

use std::path::{Path, PathBuf};

use etl_common::{any_to_string, column_names, value_at};
use etl_model::{EtlError, Result, WriteMode};
use polars::prelude::{AnyValue, DataFrame, DataType};
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info};

/// Destination for whole tables.
pub trait TableSink {
    /// Write `frame` as `table`, returning the number of rows written.
    fn write_table(&mut self, table: &str, frame: &DataFrame, mode: &WriteMode) -> Result<usize>;
}

/// Target database receiving the merged table and its enrichment.
pub struct SqliteTarget {
    pub(crate) connection: Connection,
    pub(crate) db_path: PathBuf,
    pub(crate) sql_dir: PathBuf,
}

impl std::fmt::Debug for SqliteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTarget")
            .field("db_path", &self.db_path)
            .field("sql_dir", &self.sql_dir)
            .finish_non_exhaustive()
    }
}

impl SqliteTarget {
    /// Open (creating if needed) the target database.
    ///
    /// `sql_dir` holds the view definitions and the `indexes` directory used
    /// by the enrichment step.
    pub fn open(db_path: impl Into<PathBuf>, sql_dir: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let target = db_path.display().to_string();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| EtlError::load(&target, error))?;
        }
        let connection = Connection::open(&db_path).map_err(|error| EtlError::load(&target, error))?;
        debug!(path = %db_path.display(), "opened target database");
        Ok(Self {
            connection,
            db_path,
            sql_dir: sql_dir.into(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn sql_dir(&self) -> &Path {
        &self.sql_dir
    }

    /// Underlying connection, for inspection of loaded tables.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

/// SQLite column type for a frame column.
pub fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Boolean => "BOOLEAN",
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => "INTEGER",
        DataType::Float32 | DataType::Float64 => "REAL",
        _ => "TEXT",
    }
}

fn sql_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(flag) => Value::Integer(i64::from(flag)),
        AnyValue::Int8(v) => Value::Integer(i64::from(v)),
        AnyValue::Int16(v) => Value::Integer(i64::from(v)),
        AnyValue::Int32(v) => Value::Integer(i64::from(v)),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt16(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt32(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::Real(v as f64),
        },
        AnyValue::Float32(v) if v.is_nan() => Value::Null,
        AnyValue::Float64(v) if v.is_nan() => Value::Null,
        AnyValue::Float32(v) => Value::Real(f64::from(v)),
        AnyValue::Float64(v) => Value::Real(v),
        AnyValue::String(text) => Value::Text(text.to_string()),
        other => Value::Text(any_to_string(other)),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table: &str, frame: &DataFrame, if_not_exists: bool) -> String {
    let columns: Vec<String> = frame
        .get_columns()
        .iter()
        .map(|column| format!("{} {}", quote_ident(column.name()), sql_type(column.dtype())))
        .collect();
    format!(
        "CREATE TABLE {}{} ({})",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        quote_ident(table),
        columns.join(", ")
    )
}

fn insert_sql(table: &str, names: &[String], mode: &WriteMode) -> String {
    let columns: Vec<String> = names.iter().map(|name| quote_ident(name)).collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|idx| format!("?{idx}")).collect();
    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    );
    if let WriteMode::Upsert { key } = mode {
        let updates: Vec<String> = names
            .iter()
            .filter(|name| *name != key)
            .map(|name| format!("{0} = excluded.{0}", quote_ident(name)))
            .collect();
        if updates.is_empty() {
            sql.push_str(&format!(" ON CONFLICT({}) DO NOTHING", quote_ident(key)));
        } else {
            sql.push_str(&format!(
                " ON CONFLICT({}) DO UPDATE SET {}",
                quote_ident(key),
                updates.join(", ")
            ));
        }
    }
    sql
}

impl TableSink for SqliteTarget {
    fn write_table(&mut self, table: &str, frame: &DataFrame, mode: &WriteMode) -> Result<usize> {
        let fail = |error: rusqlite::Error| EtlError::load(table, error);
        if frame.width() == 0 {
            return Err(EtlError::load(table, "frame has no columns"));
        }
        let names = column_names(frame);

        let transaction = self.connection.transaction().map_err(fail)?;
        match mode {
            WriteMode::Replace => {
                transaction
                    .execute_batch(&format!(
                        "DROP TABLE IF EXISTS {}; {};",
                        quote_ident(table),
                        create_table_sql(table, frame, false)
                    ))
                    .map_err(fail)?;
            }
            WriteMode::Upsert { key } => {
                if !names.iter().any(|name| name == key) {
                    return Err(EtlError::load(
                        table,
                        format!("upsert key column `{key}` is missing"),
                    ));
                }
                transaction
                    .execute_batch(&format!(
                        "{}; CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({});",
                        create_table_sql(table, frame, true),
                        quote_ident(&format!("ux_{table}_{key}")),
                        quote_ident(table),
                        quote_ident(key)
                    ))
                    .map_err(fail)?;
            }
        }

        {
            let mut statement = transaction
                .prepare(&insert_sql(table, &names, mode))
                .map_err(fail)?;
            let columns = frame.get_columns();
            for idx in 0..frame.height() {
                let values = columns.iter().map(|column| sql_value(value_at(column, idx)));
                statement.execute(params_from_iter(values)).map_err(fail)?;
            }
        }
        transaction.commit().map_err(fail)?;

        info!(
            table,
            rows = frame.height(),
            mode = mode.label(),
            "wrote target table"
        );
        Ok(frame.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_updates_every_non_key_column() {
        let names = vec!["transaction_id".to_string(), "amount".to_string()];
        let sql = insert_sql("t", &names, &WriteMode::upsert_merged());
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"transaction_id\", \"amount\") VALUES (?1, ?2) \
             ON CONFLICT(\"transaction_id\") DO UPDATE SET \"amount\" = excluded.\"amount\""
        );
    }

    #[test]
    fn identifiers_escape_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn nan_is_stored_as_null() {
        assert_eq!(sql_value(AnyValue::Float64(f64::NAN)), Value::Null);
        assert_eq!(sql_value(AnyValue::Boolean(true)), Value::Integer(1));
    }
}
