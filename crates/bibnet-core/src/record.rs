//! Domain records persisted in the relational store.
//!
//! Field sets follow the DBLP element model: publications carry the subset of
//! sub-elements the pipeline actually queries; everything else (notes, pages,
//! editors, volume metadata) is dropped at parse time and never reaches here.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Publication kind ────────────────────────────────────────────────────────

/// Source tag of a top-level publication element in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationKind {
  Article,
  InProceedings,
  Proceedings,
  Book,
  InCollection,
  PhdThesis,
  MastersThesis,
  Data,
}

impl PublicationKind {
  /// Classify a top-level element tag. `www` is not a publication kind; it
  /// holds person records and is handled separately.
  pub fn from_tag(tag: &str) -> Option<Self> {
    match tag {
      "article" => Some(Self::Article),
      "inproceedings" => Some(Self::InProceedings),
      "proceedings" => Some(Self::Proceedings),
      "book" => Some(Self::Book),
      "incollection" => Some(Self::InCollection),
      "phdthesis" => Some(Self::PhdThesis),
      "mastersthesis" => Some(Self::MastersThesis),
      "data" => Some(Self::Data),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Article => "article",
      Self::InProceedings => "inproceedings",
      Self::Proceedings => "proceedings",
      Self::Book => "book",
      Self::InCollection => "incollection",
      Self::PhdThesis => "phdthesis",
      Self::MastersThesis => "mastersthesis",
      Self::Data => "data",
    }
  }

  pub fn from_str_stored(s: &str) -> Result<Self> {
    Self::from_tag(s).ok_or_else(|| Error::UnknownKind(s.to_owned()))
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One row of the `publications` table, fully decoded.
///
/// `key` is the canonical DTD key path (e.g. `conf/crypto/BarkanBK03`) and is
/// globally unique and stable across re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
  pub key:       String,
  pub kind:      PublicationKind,
  pub mdate:     Option<String>,
  pub publtype:  Option<String>,
  pub year:      Option<u32>,
  /// Ordered author names, exactly as they appear in the dump.
  pub authors:   Vec<String>,
  /// Citation keys, after placeholder filtering.
  pub citations: Vec<String>,
  pub publisher: Option<String>,
  pub school:    Option<String>,
}

/// One row of the `persons` table, fully decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
  /// Canonical display name; unique per record after collision suffixing.
  pub name:    String,
  /// Home-page key path. Unique when present.
  pub profile: Option<String>,
  /// Alternate names, most recent first.
  pub aliases: Vec<String>,
}

// ─── Citation filtering ──────────────────────────────────────────────────────

/// A citation value is retained only if it carries at least one alphabetic
/// character. Drops blanks and placeholder punctuation such as `...` / `…`.
pub fn is_meaningful_citation(value: &str) -> bool {
  value.chars().any(|c| c.is_alphabetic())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_tag_roundtrip() {
    for tag in [
      "article",
      "inproceedings",
      "proceedings",
      "book",
      "incollection",
      "phdthesis",
      "mastersthesis",
      "data",
    ] {
      let kind = PublicationKind::from_tag(tag).unwrap();
      assert_eq!(kind.as_str(), tag);
    }
    assert!(PublicationKind::from_tag("www").is_none());
    assert!(PublicationKind::from_str_stored("webpage").is_err());
  }

  #[test]
  fn citation_filter_drops_placeholders() {
    assert!(!is_meaningful_citation(""));
    assert!(!is_meaningful_citation("..."));
    assert!(!is_meaningful_citation("…"));
    assert!(!is_meaningful_citation("  -  "));
    assert!(is_meaningful_citation("DBLP:conf/x/Y99"));
    assert!(is_meaningful_citation("journals/joc/BarkanBK08"));
  }
}
