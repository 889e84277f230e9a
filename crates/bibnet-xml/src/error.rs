//! Error type for `bibnet-xml`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("xml error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("unexpected end of document inside <{0}>")]
  TruncatedElement(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
