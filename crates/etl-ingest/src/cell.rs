//! Raw cell values and column type inference.

use etl_common::format_numeric;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};

/// Tokens read as missing values in text sources.
const NULL_TOKENS: [&str; 11] = [
    "", "NA", "N/A", "n/a", "#N/A", "NULL", "null", "NaN", "nan", "None", "<NA>",
];

/// A single raw value as delivered by a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Infer the value of a text field (CSV).
    ///
    /// ```
    /// use etl_ingest::Cell;
    ///
    /// assert_eq!(Cell::infer(" 42 "), Cell::Int(42));
    /// assert_eq!(Cell::infer("600.5"), Cell::Float(600.5));
    /// assert_eq!(Cell::infer("True"), Cell::Bool(true));
    /// assert_eq!(Cell::infer("N/A"), Cell::Null);
    /// assert_eq!(Cell::infer("INVALID"), Cell::Text("INVALID".to_string()));
    /// ```
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NULL_TOKENS.contains(&trimmed) {
            return Self::Null;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::Int(value);
        }
        if let Ok(value) = trimmed.parse::<f64>()
            && value.is_finite()
        {
            return Self::Float(value);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        Self::Text(trimmed.to_string())
    }

    fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(format_numeric(*value)),
            Self::Text(value) => Some(value.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Empty,
    Boolean,
    Int,
    Float,
    Text,
}

fn column_kind(cells: &[Cell]) -> ColumnKind {
    cells.iter().fold(ColumnKind::Empty, |kind, cell| {
        match (kind, cell) {
            (_, Cell::Null) => kind,
            (ColumnKind::Empty | ColumnKind::Boolean, Cell::Bool(_)) => ColumnKind::Boolean,
            (ColumnKind::Empty | ColumnKind::Int, Cell::Int(_)) => ColumnKind::Int,
            (ColumnKind::Empty | ColumnKind::Int | ColumnKind::Float, Cell::Int(_) | Cell::Float(_)) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        }
    })
}

/// Build a column with the narrowest type holding every non-null cell.
///
/// Booleans, integers and floats keep their native type; a column mixing
/// kinds (for example amounts next to an `INVALID` marker) becomes text.
pub fn build_column(name: &str, cells: &[Cell]) -> Column {
    match column_kind(cells) {
        ColumnKind::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Bool(value) => Some(*value),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values).into_column()
        }
        ColumnKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Int(value) => Some(*value),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values).into_column()
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Int(value) => Some(*value as f64),
                    Cell::Float(value) => Some(*value),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values).into_column()
        }
        ColumnKind::Empty | ColumnKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(Cell::render).collect();
            Series::new(name.into(), values).into_column()
        }
    }
}

/// Assemble a frame from column-major cells.
pub fn frame_from_cells(headers: &[String], columns: &[Vec<Cell>]) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = headers
        .iter()
        .zip(columns)
        .map(|(name, cells)| build_column(name, cells))
        .collect();
    DataFrame::new(columns)
}
