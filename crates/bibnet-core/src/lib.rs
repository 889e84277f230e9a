//! Core types and trait definitions for the bibnet pipeline.
//!
//! This crate is deliberately free of XML and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than serde.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod name;
pub mod record;
pub mod squash;
pub mod store;

pub use error::{Error, Result};
