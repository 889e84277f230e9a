//! Error type for `bibnet-resolve`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("spreadsheet error: {0}")]
  Spreadsheet(#[from] calamine::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("roster sheet has no {0:?} column")]
  MissingColumn(&'static str),

  #[error("roster file has no sheets")]
  EmptyWorkbook,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
