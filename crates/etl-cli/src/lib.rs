//! Pipeline orchestration and process setup for the `run-etl` binary.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
