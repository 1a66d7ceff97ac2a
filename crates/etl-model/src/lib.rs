pub mod error;
pub mod options;
pub mod schema;

pub use error::{EtlError, Result};
pub use options::{DEFAULT_HIGH_VALUE_THRESHOLD, LoadOptions, TransformOptions, WriteMode};
