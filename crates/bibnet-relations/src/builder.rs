//! Building the temporal relation table.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;

use bibnet_core::{record::PersonRecord, store::BibStore};

/// Default lower bound of the year range.
const DEFAULT_MIN_YEAR: u32 = 1961;

// ─── Year range ──────────────────────────────────────────────────────────────

/// Inclusive range of year bands in the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
  pub min: u32,
  pub max: u32,
}

impl YearRange {
  pub fn new(min: u32, max: u32) -> Self {
    Self { min: min.min(max), max: min.max(max) }
  }

  pub fn years(&self) -> std::ops::RangeInclusive<u32> {
    self.min..=self.max
  }

  /// Number of year bands; never zero.
  pub fn bands(&self) -> usize {
    (self.max - self.min + 1) as usize
  }
}

impl Default for YearRange {
  fn default() -> Self {
    Self::new(DEFAULT_MIN_YEAR, chrono::Utc::now().year() as u32)
  }
}

// ─── Output model ────────────────────────────────────────────────────────────

/// One author's cumulative collaborator sets, one cell per year band,
/// collaborators sorted within each cell for deterministic output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow {
  pub author: String,
  pub cells:  Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalRelations {
  pub range: YearRange,
  pub rows:  Vec<RelationRow>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Build the temporal relation table for the given resolved authors.
///
/// A publication in year Y contributes its co-authors to every band from Y
/// onward, including publications dated before `range.min` (cumulative "as
/// of"). Authors whose dated publications list no co-authors are omitted
/// entirely — indistinguishable here from authors with zero publications.
pub async fn build_relations<S: BibStore>(
  store: &S,
  authors: &[PersonRecord],
  range: YearRange,
) -> Result<TemporalRelations, S::Error> {
  let mut rows = Vec::new();

  for author in authors {
    let publications = store.publications_by_author(&author.name).await?;

    let mut by_year: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
    for publication in publications {
      let Some(year) = publication.year else { continue };
      for co_author in publication.authors {
        if co_author != author.name {
          by_year.entry(year).or_default().insert(co_author);
        }
      }
    }
    if by_year.is_empty() {
      tracing::debug!(author = %author.name, "no dated co-authored publications; omitted");
      continue;
    }

    let mut pending = by_year.into_iter().peekable();
    let mut running: BTreeSet<String> = BTreeSet::new();
    let mut cells = Vec::with_capacity(range.bands());
    for year in range.years() {
      while let Some((_, collaborators)) = pending.next_if(|(y, _)| *y <= year) {
        running.extend(collaborators);
      }
      cells.push(running.iter().cloned().collect());
    }

    // Everything dated after range.max: nothing lands in any band.
    if running.is_empty() {
      tracing::debug!(author = %author.name, "no collaborators within range; omitted");
      continue;
    }

    rows.push(RelationRow { author: author.name.clone(), cells });
  }

  tracing::info!(authors = rows.len(), "built temporal relations");
  Ok(TemporalRelations { range, rows })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
