//! Run configuration resolved from the environment.
//!
//! The configuration is built once at startup from an environment name
//! (`dev`, `test` or `prod`) and that environment's env file, then passed by
//! reference to every stage. Nothing below reads the process environment
//! after [`PipelineConfig::load`] returns.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use etl_model::{
    DEFAULT_HIGH_VALUE_THRESHOLD, EtlError, LoadOptions, Result, TransformOptions, WriteMode,
};
use tracing::{debug, info};

pub const SOURCE_DB_PATH: &str = "SOURCE_DB_PATH";
pub const TARGET_DB_PATH: &str = "TARGET_DB_PATH";
pub const CUSTOMERS_CSV_PATH: &str = "CUSTOMERS_CSV_PATH";
pub const SQL_DIR: &str = "SQL_DIR";
pub const OUTPUT_DIR: &str = "OUTPUT_DIR";
pub const HIGH_VALUE_THRESHOLD: &str = "HIGH_VALUE_THRESHOLD";

const DEFAULT_CUSTOMERS_CSV: &str = "data/raw/unclean_customers.csv";
const DEFAULT_SQL_DIR: &str = "sql";
const DEFAULT_OUTPUT_DIR: &str = "data/processed";

/// Query file, relative to the SQL directory, extracting transactions.
pub const TRANSACTIONS_QUERY_FILE: &str = "extract_transactions.sql";

/// Deployment environment selecting the env file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Dev, Self::Test, Self::Prod];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Prod => "prod",
        }
    }

    /// `.env` for production, `.env.<name>` otherwise.
    pub fn env_file(self) -> String {
        match self {
            Self::Prod => ".env".to_string(),
            other => format!(".env.{}", other.as_str()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = EtlError;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == value)
            .ok_or_else(|| {
                let choices: Vec<&str> = Self::ALL.iter().map(|env| env.as_str()).collect();
                EtlError::configuration(format!(
                    "unknown environment `{value}`; expected one of: {}",
                    choices.join(", ")
                ))
            })
    }
}

/// Everything a pipeline run needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub environment: Environment,
    pub source_db_path: PathBuf,
    pub target_db_path: PathBuf,
    pub customers_csv_path: PathBuf,
    pub sql_dir: PathBuf,
    pub output_dir: PathBuf,
    pub high_value_threshold: f64,
    pub write_mode: WriteMode,
    /// Write CSV audit snapshots of every intermediate table.
    pub snapshots: bool,
}

fn database_path(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    role: &str,
) -> Result<PathBuf> {
    let value = lookup(key).map(|value| value.trim().to_string());
    match value.as_deref() {
        None | Some("") => Err(EtlError::configuration(format!(
            "{key} is not set ({role} path)"
        ))),
        Some("error") => Err(EtlError::configuration(format!(
            "{role} path is set to 'error'"
        ))),
        Some(path) => Ok(PathBuf::from(path)),
    }
}

fn optional_path(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> PathBuf {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}

/// Parse a spend threshold, accepting only finite numbers.
pub fn parse_threshold(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            EtlError::configuration(format!(
                "{HIGH_VALUE_THRESHOLD} must be a finite number, got `{raw}`"
            ))
        })
}

impl PipelineConfig {
    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(
        environment: Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let source_db_path = database_path(&lookup, SOURCE_DB_PATH, "source_database")?;
        let target_db_path = database_path(&lookup, TARGET_DB_PATH, "target_database")?;
        let high_value_threshold = match lookup(HIGH_VALUE_THRESHOLD) {
            Some(raw) if !raw.trim().is_empty() => parse_threshold(&raw)?,
            _ => DEFAULT_HIGH_VALUE_THRESHOLD,
        };
        Ok(Self {
            environment,
            source_db_path,
            target_db_path,
            customers_csv_path: optional_path(&lookup, CUSTOMERS_CSV_PATH, DEFAULT_CUSTOMERS_CSV),
            sql_dir: optional_path(&lookup, SQL_DIR, DEFAULT_SQL_DIR),
            output_dir: optional_path(&lookup, OUTPUT_DIR, DEFAULT_OUTPUT_DIR),
            high_value_threshold,
            write_mode: WriteMode::default(),
            snapshots: true,
        })
    }

    /// Build a configuration from the process environment alone.
    pub fn from_env(environment: Environment) -> Result<Self> {
        Self::from_lookup(environment, |key| std::env::var(key).ok())
    }

    /// Build a configuration from the environment's env file in `dir` and
    /// the process environment.
    ///
    /// Values in the env file take precedence. A missing env file is not an
    /// error; an unreadable or malformed one is.
    pub fn load(environment: Environment, dir: &Path) -> Result<Self> {
        let path = dir.join(environment.env_file());
        let file_values = read_env_file(&path)?;
        if file_values.is_some() {
            info!(path = %path.display(), "loaded environment file");
        } else {
            debug!(path = %path.display(), "no environment file, using process environment");
        }
        let file_values = file_values.unwrap_or_default();
        Self::from_lookup(environment, |key| {
            file_values
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
    }

    pub fn transactions_query_path(&self) -> PathBuf {
        self.sql_dir.join(TRANSACTIONS_QUERY_FILE)
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            high_value_threshold: self.high_value_threshold,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_write_mode(self.write_mode.clone())
            .with_threshold(self.high_value_threshold)
    }

    /// Resolved settings as display rows.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("environment", self.environment.to_string()),
            ("source database", self.source_db_path.display().to_string()),
            ("target database", self.target_db_path.display().to_string()),
            ("customers csv", self.customers_csv_path.display().to_string()),
            ("sql dir", self.sql_dir.display().to_string()),
            ("output dir", self.output_dir.display().to_string()),
            ("high-value threshold", self.high_value_threshold.to_string()),
            ("write mode", self.write_mode.label().to_string()),
            ("snapshots", self.snapshots.to_string()),
        ]
    }
}

fn read_env_file(path: &Path) -> Result<Option<HashMap<String, String>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let fail = |error: dotenv::Error| {
        EtlError::configuration(format!("read {}: {error}", path.display()))
    };
    let mut values = HashMap::new();
    for item in dotenv::from_path_iter(path).map_err(fail)? {
        let (key, value) = item.map_err(fail)?;
        values.insert(key, value);
    }
    Ok(Some(values))
}
