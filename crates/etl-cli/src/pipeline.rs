//! Pipeline orchestration with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Extract**: read transactions and customers from their sources
//! 2. **Transform**: clean both tables, merge them, aggregate high-value customers
//! 3. **Snapshot**: write CSV audit copies of every transformed table (optional)
//! 4. **Load**: write the merged table, then apply indexes, then create views
//!
//! Each stage consumes only the previous stage's output and never mutates
//! it. The first failure aborts the run; nothing already committed to the
//! target is rolled back.

use std::path::Path;
use std::time::Instant;

use etl_ingest::{CsvFileSource, SqliteQuerySource, TableSource, extract_table};
use etl_load::{Enrichment, SnapshotManifest, SnapshotWriter, SqliteTarget, TableSink};
use etl_model::schema::{
    CLEANED_CUSTOMERS, CLEANED_HIGH_VALUE_CUSTOMERS, CLEANED_TRANSACTIONS, HIGH_VALUE_CUSTOMERS,
    MERGED_DATA,
};
use etl_model::{LoadOptions, Result, TransformOptions};
use etl_transform::{TransformedTables, transform_tables};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use crate::config::PipelineConfig;
use crate::types::{ExtractedCounts, RunResult, TableSummary};

pub const TRANSACTIONS_SOURCE: &str = "transactions";
pub const CUSTOMERS_SOURCE: &str = "customers";

// ============================================================================
// Stage 1: Extract
// ============================================================================

/// Raw tables as read from the sources.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub transactions: DataFrame,
    pub customers: DataFrame,
}

impl Extracted {
    pub fn counts(&self) -> ExtractedCounts {
        ExtractedCounts {
            transactions: self.transactions.height(),
            customers: self.customers.height(),
        }
    }
}

/// Read both sources; transactions first.
pub fn extract(transactions: &dyn TableSource, customers: &dyn TableSource) -> Result<Extracted> {
    let _span = info_span!("extract").entered();
    let transactions = extract_table(transactions)?;
    let customers = extract_table(customers)?;
    Ok(Extracted {
        transactions,
        customers,
    })
}

// ============================================================================
// Stage 2: Transform
// ============================================================================

pub fn transform(extracted: &Extracted, options: &TransformOptions) -> Result<TransformedTables> {
    let _span = info_span!("transform", threshold = options.high_value_threshold).entered();
    transform_tables(&extracted.transactions, &extracted.customers, options)
}

/// Snapshot names paired with their tables, in output order.
pub fn snapshot_tables(tables: &TransformedTables) -> [(&'static str, &DataFrame); 5] {
    [
        (CLEANED_TRANSACTIONS, &tables.cleaned_transactions),
        (CLEANED_CUSTOMERS, &tables.cleaned_customers),
        (MERGED_DATA, &tables.merged),
        (HIGH_VALUE_CUSTOMERS, &tables.high_value),
        (CLEANED_HIGH_VALUE_CUSTOMERS, &tables.cleaned_high_value),
    ]
}

// ============================================================================
// Stage 3: Snapshot
// ============================================================================

pub fn write_snapshots(
    writer: &SnapshotWriter,
    tables: &TransformedTables,
    environment: &str,
    threshold: f64,
) -> Result<SnapshotManifest> {
    let _span = info_span!("snapshot", dir = %writer.dir().display()).entered();
    writer.write_all(&snapshot_tables(tables), environment, threshold)
}

// ============================================================================
// Stage 4: Load
// ============================================================================

/// What the load stage left in the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub table: String,
    pub rows: usize,
    pub indexes: Vec<String>,
    pub views: Vec<String>,
}

/// Write the merged table, then run the enrichment steps.
///
/// The table write is committed before enrichment starts, so an enrichment
/// failure leaves the new table in place.
pub fn load<T>(
    target: &mut T,
    tables: &TransformedTables,
    options: &LoadOptions,
) -> Result<LoadOutcome>
where
    T: TableSink + Enrichment + ?Sized,
{
    let _span = info_span!("load", table = %options.merged_table).entered();
    let rows = target.write_table(&options.merged_table, &tables.merged, &options.write_mode)?;
    let indexes = target.apply_indexes()?;
    let views = target.create_views(&options.view_params())?;
    Ok(LoadOutcome {
        table: options.merged_table.clone(),
        rows,
        indexes,
        views,
    })
}

// ============================================================================
// Whole run
// ============================================================================

/// Collaborators and options for one run.
pub struct PipelineInputs<'a> {
    pub environment: &'a str,
    pub transactions: &'a dyn TableSource,
    pub customers: &'a dyn TableSource,
    pub transform: TransformOptions,
    pub load: LoadOptions,
    pub snapshots: Option<&'a SnapshotWriter>,
}

/// Run every stage in order.
///
/// The target is opened only once the data is ready to load, so a run that
/// fails earlier never touches it.
pub fn run_pipeline<T, F>(inputs: &PipelineInputs<'_>, open_target: F) -> Result<RunResult>
where
    T: TableSink + Enrichment,
    F: FnOnce() -> Result<T>,
{
    let started = Instant::now();
    let _span = info_span!("pipeline", environment = inputs.environment).entered();

    let extracted = extract(inputs.transactions, inputs.customers)?;
    let tables = transform(&extracted, &inputs.transform)?;
    let snapshot_dir = match inputs.snapshots {
        Some(writer) => {
            write_snapshots(
                writer,
                &tables,
                inputs.environment,
                inputs.transform.high_value_threshold,
            )?;
            Some(writer.dir().to_path_buf())
        }
        None => None,
    };
    let mut target = open_target()?;
    let outcome = load(&mut target, &tables, &inputs.load)?;

    let elapsed = started.elapsed();
    info!(
        loaded_rows = outcome.rows,
        elapsed_secs = elapsed.as_secs_f64(),
        "pipeline run successful"
    );
    Ok(RunResult {
        environment: inputs.environment.to_string(),
        extracted: extracted.counts(),
        tables: snapshot_tables(&tables)
            .iter()
            .map(|(name, frame)| TableSummary::of(name, frame))
            .collect(),
        target_table: outcome.table,
        loaded_rows: outcome.rows,
        indexes: outcome.indexes,
        views: outcome.views,
        snapshot_dir,
        elapsed,
    })
}

/// Build the production collaborators from `config` and run.
pub fn run_with_config(config: &PipelineConfig) -> Result<RunResult> {
    let transactions = SqliteQuerySource::from_sql_file(
        TRANSACTIONS_SOURCE,
        &config.source_db_path,
        &config.transactions_query_path(),
    )?;
    let customers = CsvFileSource::new(CUSTOMERS_SOURCE, &config.customers_csv_path);
    let snapshots = config
        .snapshots
        .then(|| SnapshotWriter::new(&config.output_dir));
    let inputs = PipelineInputs {
        environment: config.environment.as_str(),
        transactions: &transactions,
        customers: &customers,
        transform: config.transform_options(),
        load: config.load_options(),
        snapshots: snapshots.as_ref(),
    };
    run_pipeline(&inputs, || {
        SqliteTarget::open(&config.target_db_path, &config.sql_dir)
    })
}

/// Whether each input a run reads is present, relative to the current
/// directory.
pub fn input_presence(config: &PipelineConfig) -> Vec<(&'static str, bool)> {
    let exists = |path: &Path| path.exists();
    vec![
        ("source database", exists(&config.source_db_path)),
        ("customers csv", exists(&config.customers_csv_path)),
        ("transactions query", exists(&config.transactions_query_path())),
        ("sql dir", exists(&config.sql_dir)),
    ]
}
