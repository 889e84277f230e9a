//! Error type for `bibnet-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] bibnet_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("xml error: {0}")]
  Xml(#[from] bibnet_xml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
