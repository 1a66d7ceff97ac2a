use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use etl_cli::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Environment: {}", result.environment);
    println!(
        "Extracted: {} transactions, {} customers",
        result.extracted.transactions, result.extracted.customers
    );
    if let Some(dir) = &result.snapshot_dir {
        println!("Snapshots: {}", dir.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for summary in &result.tables {
        table.add_row(vec![
            Cell::new(&summary.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(summary.rows),
            Cell::new(summary.columns),
        ]);
    }
    println!("{table}");

    let mut target = Table::new();
    target.set_header(vec![header_cell("Target"), header_cell("Loaded")]);
    apply_table_style(&mut target);
    target.add_row(vec![
        Cell::new(format!("table {}", result.target_table)),
        Cell::new(format!("{} rows", result.loaded_rows)),
    ]);
    for index in &result.indexes {
        target.add_row(vec![Cell::new(format!("index {index}")), status_cell(true)]);
    }
    for view in &result.views {
        target.add_row(vec![Cell::new(format!("view {view}")), status_cell(true)]);
    }
    println!("{target}");
    println!(
        "ETL pipeline run successfully in {} environment ({:.2}s)",
        result.environment,
        result.elapsed.as_secs_f64()
    );
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn status_cell(ok: bool) -> Cell {
    if ok {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
