//! Writing the temporal relation table as a plain delimited artifact.
//!
//! First column is the author identity, then one column per year band. Each
//! cell is the squash-encoded collaborator set, which downstream graph
//! tooling splits back on `::`.

use std::path::Path;

use bibnet_core::squash::squash;

use crate::{Result, builder::TemporalRelations};

/// Write the relation table to `path`, overwriting any previous artifact.
/// Called only once the whole table is built, so an interrupted run never
/// leaves a partial artifact behind.
pub fn write_relations_csv(
  relations: &TemporalRelations,
  path: impl AsRef<Path>,
) -> Result<()> {
  let mut writer = csv::WriterBuilder::new().from_path(path)?;

  let mut header = vec!["author".to_owned()];
  header.extend(relations.range.years().map(|y| y.to_string()));
  writer.write_record(&header)?;

  for row in &relations.rows {
    let mut record = vec![row.author.clone()];
    record.extend(row.cells.iter().map(|cell| squash(cell)));
    writer.write_record(&record)?;
  }

  writer.flush()?;
  tracing::info!(
    rows = relations.rows.len(),
    bands = relations.range.bands(),
    "wrote temporal relation table"
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use crate::builder::{RelationRow, YearRange};

  use super::*;

  #[test]
  fn writes_header_and_squashed_cells() {
    let relations = TemporalRelations {
      range: YearRange::new(2000, 2001),
      rows:  vec![RelationRow {
        author: "John Middle Doe".into(),
        cells:  vec![
          vec!["Alice Smith".into()],
          vec!["Alice Smith".into(), "Bob Jones".into()],
        ],
      }],
    };

    let file = tempfile::NamedTempFile::new().unwrap();
    write_relations_csv(&relations, file.path()).unwrap();

    let mut reader = csv::ReaderBuilder::new().from_path(file.path()).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.iter().collect::<Vec<_>>(), ["author", "2000", "2001"]);

    let rows: Vec<csv::StringRecord> =
      reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "John Middle Doe");
    assert_eq!(&rows[0][1], "::Alice Smith::");
    assert_eq!(&rows[0][2], "::Alice Smith::Bob Jones::");
  }
}
