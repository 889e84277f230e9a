//! Roster file loading, deduplication, and the filtered-roster CSV artifact.
//!
//! The raw roster is a spreadsheet with a `name` column (free-text author
//! name) and a `dblp` column (home-page identifier). The filtered artifact
//! written after resolution holds the matched canonical persons and is the
//! resume point for relation building.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use bibnet_core::{
  record::PersonRecord,
  squash::{squash, unsquash},
};

use crate::{Error, Result};

/// One row of the external roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
  pub name:     String,
  /// Dataset home-page identifier; dedup key.
  pub homepage: String,
}

// ─── Spreadsheet input ───────────────────────────────────────────────────────

/// Load the raw roster from an Excel workbook. Reads the first sheet; the
/// header row must name a `name` and a `dblp` column (case-insensitive).
pub fn load_roster_xls(path: impl AsRef<Path>) -> Result<Vec<RosterEntry>> {
  let mut workbook = open_workbook_auto(path)?;
  let sheet = workbook
    .sheet_names()
    .first()
    .cloned()
    .ok_or(Error::EmptyWorkbook)?;
  let range = workbook.worksheet_range(&sheet)?;

  let mut rows = range.rows();
  let header = rows.next().ok_or(Error::MissingColumn("name"))?;

  let column = |wanted: &'static str| -> Result<usize> {
    header
      .iter()
      .position(|cell| cell_text(cell).eq_ignore_ascii_case(wanted))
      .ok_or(Error::MissingColumn(wanted))
  };
  let name_col = column("name")?;
  let dblp_col = column("dblp")?;

  let mut entries = Vec::new();
  for row in rows {
    let name = row.get(name_col).map(cell_text).unwrap_or_default();
    if name.is_empty() {
      continue;
    }
    let homepage = row.get(dblp_col).map(cell_text).unwrap_or_default();
    entries.push(RosterEntry { name, homepage });
  }

  tracing::info!(entries = entries.len(), "loaded roster");
  Ok(entries)
}

fn cell_text(cell: &Data) -> String {
  match cell {
    Data::String(s) => s.trim().to_owned(),
    Data::Empty => String::new(),
    other => other.to_string().trim().to_owned(),
  }
}

/// Collapse roster rows that share the same home-page identifier, keeping
/// the first occurrence. Rows without an identifier are kept as-is.
pub fn dedup_by_homepage(entries: Vec<RosterEntry>) -> Vec<RosterEntry> {
  let before = entries.len();
  let mut seen = std::collections::HashSet::new();
  let deduped: Vec<RosterEntry> = entries
    .into_iter()
    .filter(|e| e.homepage.is_empty() || seen.insert(e.homepage.clone()))
    .collect();
  tracing::info!(before, after = deduped.len(), "deduplicated roster");
  deduped
}

// ─── Filtered-roster artifact ────────────────────────────────────────────────

/// Write the resolved persons to the filtered-roster CSV artifact,
/// overwriting any previous file.
pub fn write_filtered_roster(
  persons: &[PersonRecord],
  path: impl AsRef<Path>,
) -> Result<()> {
  let mut writer = csv::WriterBuilder::new().from_path(path)?;
  writer.write_record(["name", "profile", "aliases"])?;
  for person in persons {
    writer.write_record([
      person.name.as_str(),
      person.profile.as_deref().unwrap_or(""),
      &squash(&person.aliases),
    ])?;
  }
  writer.flush().map_err(Error::Io)?;
  Ok(())
}

/// Read a previously written filtered-roster artifact.
pub fn read_filtered_roster(path: impl AsRef<Path>) -> Result<Vec<PersonRecord>> {
  let mut reader = csv::ReaderBuilder::new().from_path(path)?;
  let mut persons = Vec::new();
  for row in reader.records() {
    let row = row?;
    let name = row.get(0).unwrap_or("").to_owned();
    if name.is_empty() {
      continue;
    }
    let profile = row.get(1).filter(|p| !p.is_empty()).map(str::to_owned);
    let aliases = unsquash(row.get(2).unwrap_or(""));
    persons.push(PersonRecord { name, profile, aliases });
  }
  Ok(persons)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(name: &str, homepage: &str) -> RosterEntry {
    RosterEntry { name: name.into(), homepage: homepage.into() }
  }

  #[test]
  fn dedup_keeps_first_occurrence() {
    let deduped = dedup_by_homepage(vec![
      entry("J. Doe", "homepages/d/1"),
      entry("John Doe", "homepages/d/1"),
      entry("A. Smith", "homepages/s/1"),
      entry("No Homepage", ""),
      entry("Also None", ""),
    ]);
    assert_eq!(
      deduped,
      vec![
        entry("J. Doe", "homepages/d/1"),
        entry("A. Smith", "homepages/s/1"),
        entry("No Homepage", ""),
        entry("Also None", ""),
      ]
    );
  }

  #[test]
  fn filtered_roster_roundtrip() {
    let persons = vec![
      PersonRecord {
        name:    "John Middle Doe".into(),
        profile: Some("homepages/d/JohnDoe".into()),
        aliases: vec!["Johnny Doe".into(), "J. M. Doe".into()],
      },
      PersonRecord { name: "Anne Canteaut".into(), profile: None, aliases: vec![] },
    ];

    let file = tempfile::NamedTempFile::new().unwrap();
    write_filtered_roster(&persons, file.path()).unwrap();
    let back = read_filtered_roster(file.path()).unwrap();
    assert_eq!(back, persons);
  }
}
