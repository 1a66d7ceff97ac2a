//! Load stage.
//!
//! - **sink**: [`TableSink`] and the SQLite target writing frames as tables
//! - **enrichment**: [`Enrichment`] (indexes and views run after the write)
//! - **snapshot**: CSV audit snapshots and their manifest

pub mod enrichment;
pub mod sink;
pub mod snapshot;

pub use enrichment::{
    CLEANED_HIGH_VALUE_VIEW_SQL, Enrichment, HIGH_VALUE_VIEW_SQL, INDEX_DIR, bind_view_params,
};
pub use sink::{SqliteTarget, TableSink, sql_type};
pub use snapshot::{MANIFEST_FILE, SnapshotEntry, SnapshotManifest, SnapshotWriter};
