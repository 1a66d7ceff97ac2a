//! Post-load enrichment: indexes and high-value views.

use std::collections::BTreeMap;
use std::path::Path;

use etl_common::{format_numeric, list_sql_files, read_sql_file};
use etl_model::{EtlError, Result};
use tracing::info;

use crate::sink::SqliteTarget;

/// Directory under the SQL directory holding one index definition per file.
pub const INDEX_DIR: &str = "indexes";
pub const HIGH_VALUE_VIEW_SQL: &str = "high_value_customers_view.sql";
pub const CLEANED_HIGH_VALUE_VIEW_SQL: &str = "high_value_customers_cleaned_view.sql";

const TARGET: &str = "enrichment";

/// Steps run against the target after the main table has been written.
pub trait Enrichment {
    /// Apply every index definition; returns the applied file names.
    fn apply_indexes(&mut self) -> Result<Vec<String>>;

    /// (Re)create the high-value views with `params` substituted into their
    /// predicates; returns the executed file names.
    fn create_views(&mut self, params: &BTreeMap<String, f64>) -> Result<Vec<String>>;
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Substitute `:name` placeholders with numeric literals.
///
/// Each placeholder is matched as a whole identifier, so `:t` never rewrites
/// part of `:threshold`. `::` casts and `:1`-style tokens pass through. A
/// placeholder without a value is an error.
pub fn bind_view_params(sql: &str, params: &BTreeMap<String, f64>) -> Result<String> {
    let mut bound = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut prev = None;
    while let Some(c) = chars.next() {
        let starts_name = chars
            .peek()
            .is_some_and(|next| is_ident_char(*next) && !next.is_ascii_digit());
        if c != ':' || prev == Some(':') || !starts_name {
            bound.push(c);
            prev = Some(c);
            continue;
        }
        let mut name = String::new();
        while let Some(next) = chars.next_if(|next| is_ident_char(*next)) {
            name.push(next);
        }
        let Some(&value) = params.get(&name) else {
            return Err(EtlError::load(
                TARGET,
                format!("no value bound for view parameter `{name}`"),
            ));
        };
        if !value.is_finite() {
            return Err(EtlError::load(
                TARGET,
                format!("view parameter `{name}` is not a finite number"),
            ));
        }
        bound.push_str(&format_numeric(value));
        prev = name.chars().last();
    }
    Ok(bound)
}

impl Enrichment for SqliteTarget {
    fn apply_indexes(&mut self) -> Result<Vec<String>> {
        let dir = self.sql_dir.join(INDEX_DIR);
        let files = list_sql_files(&dir).map_err(|error| {
            EtlError::load(TARGET, format!("read index directory {}: {error}", dir.display()))
        })?;

        let transaction = self
            .connection
            .transaction()
            .map_err(|error| EtlError::load(TARGET, error))?;
        let mut applied = Vec::with_capacity(files.len());
        for path in files {
            let label = file_label(&path);
            let sql = read_sql_file(&path)
                .map_err(|error| EtlError::load(TARGET, format!("read {label}: {error}")))?;
            transaction
                .execute_batch(&sql)
                .map_err(|error| EtlError::load(TARGET, format!("index {label}: {error}")))?;
            info!(file = %label, "index created");
            applied.push(label);
        }
        transaction
            .commit()
            .map_err(|error| EtlError::load(TARGET, error))?;
        Ok(applied)
    }

    fn create_views(&mut self, params: &BTreeMap<String, f64>) -> Result<Vec<String>> {
        let mut created = Vec::new();
        for file in [HIGH_VALUE_VIEW_SQL, CLEANED_HIGH_VALUE_VIEW_SQL] {
            let path = self.sql_dir.join(file);
            let sql = read_sql_file(&path).map_err(|error| {
                EtlError::load(TARGET, format!("read {}: {error}", path.display()))
            })?;
            let sql = bind_view_params(&sql, params)?;
            self.connection
                .execute_batch(&sql)
                .map_err(|error| EtlError::load(TARGET, format!("view {file}: {error}")))?;
            info!(file, "view created");
            created.push(file.to_string());
        }
        Ok(created)
    }
}
