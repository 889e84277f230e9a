//! Opening the dump file, transparently decompressing gzip.

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use flate2::read::GzDecoder;

use crate::Result;

/// Open the dump at `path` as a buffered byte stream.
///
/// A `.gz` extension selects streaming gzip decompression; anything else is
/// read as plain XML. The stream is forward-only and not restartable.
pub fn open_dump(path: impl AsRef<Path>) -> Result<Box<dyn BufRead + Send>> {
  let path = path.as_ref();
  let file = File::open(path)?;

  let gzipped = path.extension().is_some_and(|ext| ext == "gz");
  if gzipped {
    Ok(Box::new(BufReader::new(GzDecoder::new(BufReader::new(file)))))
  } else {
    Ok(Box::new(BufReader::new(file)))
  }
}
