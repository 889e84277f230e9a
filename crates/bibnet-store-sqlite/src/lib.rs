//! SQLite backend for the bibnet relational store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One writer during ingestion, any
//! number of readers afterwards.

mod encode;
mod ingest;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use ingest::{IngestReport, ingest_batches, ingest_dump};
pub use store::SqliteStore;
