//! Error types for `bibnet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("name has no segments: {0:?}")]
  EmptyName(String),

  #[error("unknown publication kind tag: {0:?}")]
  UnknownKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
