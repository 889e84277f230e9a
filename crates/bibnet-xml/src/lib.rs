//! Streaming parser for the DBLP XML dump.
//!
//! The dump expands to several gigabytes, so it is never materialized as a
//! tree. [`ElementBatches`] walks the document as a lazy, forward-only
//! sequence of top-level elements and yields bounded batches of parsed
//! records, keeping peak memory independent of document size.

pub mod error;
mod parse;
mod source;

pub use error::{Error, Result};
pub use parse::{Batch, ElementBatches};
pub use source::open_dump;
