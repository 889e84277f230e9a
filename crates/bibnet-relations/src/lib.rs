//! Per-author yearly collaboration snapshots.
//!
//! For each resolved author, every year band in the configured range holds
//! the cumulative set of collaborators known by that year. This is the most
//! expensive stage in wall-clock terms (one authors-lookup per author), so
//! it emits a single self-contained CSV artifact on full completion rather
//! than incremental partial files.

pub mod builder;
pub mod error;
pub mod table;

pub use builder::{RelationRow, TemporalRelations, YearRange, build_relations};
pub use error::{Error, Result};
pub use table::write_relations_csv;
