//! Options consumed by the transform and load stages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::{MERGED_TABLE, TRANSACTION_ID};

/// Spend above which a customer counts as high value.
pub const DEFAULT_HIGH_VALUE_THRESHOLD: f64 = 500.0;

/// Options for the transform stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Strict lower bound on `total_spend` for the high-value aggregate.
    pub high_value_threshold: f64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            high_value_threshold: DEFAULT_HIGH_VALUE_THRESHOLD,
        }
    }
}

/// How a table is written to the target store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Drop and recreate the table.
    #[default]
    Replace,
    /// Insert, updating every non-key column when the key already exists.
    Upsert { key: String },
}

impl WriteMode {
    /// Upsert keyed on `transaction_id`, the unique key of the merged table.
    pub fn upsert_merged() -> Self {
        Self::Upsert {
            key: TRANSACTION_ID.to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Upsert { .. } => "upsert",
        }
    }
}

/// Options for the load stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    pub merged_table: String,
    pub write_mode: WriteMode,
    pub high_value_threshold: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            merged_table: MERGED_TABLE.to_string(),
            write_mode: WriteMode::default(),
            high_value_threshold: DEFAULT_HIGH_VALUE_THRESHOLD,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.high_value_threshold = threshold;
        self
    }

    /// Parameters bound into the view definitions.
    pub fn view_params(&self) -> BTreeMap<String, f64> {
        let mut params = BTreeMap::new();
        params.insert(
            "total_spend_threshold".to_string(),
            self.high_value_threshold,
        );
        params
    }
}
