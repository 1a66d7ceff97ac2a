use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tracing::info;

use etl_cli::config::{Environment, PipelineConfig, parse_threshold};
use etl_cli::pipeline::{input_presence, run_with_config};
use etl_cli::types::RunResult;
use etl_model::WriteMode;

use crate::cli::{ConfigArgs, RunArgs, WriteModeArg};
use crate::summary::{apply_table_style, status_cell};

/// Parse the environment name and load its configuration from the current
/// directory's env file.
fn resolve_config(environment: &str) -> Result<PipelineConfig> {
    let environment: Environment = environment.parse()?;
    let dir = std::env::current_dir().context("resolve current directory")?;
    Ok(PipelineConfig::load(environment, &dir)?)
}

fn apply_overrides(config: &mut PipelineConfig, args: &RunArgs) -> Result<()> {
    if let Some(raw) = &args.threshold {
        config.high_value_threshold = parse_threshold(raw)?;
    }
    config.write_mode = match args.write_mode {
        WriteModeArg::Replace => WriteMode::Replace,
        WriteModeArg::Upsert => WriteMode::upsert_merged(),
    };
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if args.no_snapshots {
        config.snapshots = false;
    }
    Ok(())
}

pub fn run_etl(args: &RunArgs) -> Result<RunResult> {
    let mut config = resolve_config(&args.environment)?;
    apply_overrides(&mut config, args)?;
    info!(
        environment = %config.environment,
        threshold = config.high_value_threshold,
        write_mode = config.write_mode.label(),
        "starting pipeline"
    );
    Ok(run_with_config(&config)?)
}

pub fn show_config(args: &ConfigArgs) -> Result<()> {
    let config = resolve_config(&args.environment)?;
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    apply_table_style(&mut table);
    for (key, value) in config.entries() {
        table.add_row(vec![key.to_string(), value]);
    }
    println!("{table}");

    let mut inputs = Table::new();
    inputs.set_header(vec!["Input", "Present"]);
    apply_table_style(&mut inputs);
    for (name, present) in input_presence(&config) {
        inputs.add_row(vec![Cell::new(name), status_cell(present)]);
    }
    println!("{inputs}");
    Ok(())
}
