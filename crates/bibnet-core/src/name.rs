//! Author-name segmentation, the ordered-segment matching rule, and the
//! collision-suffix ledger used at ingestion time.
//!
//! Dataset names preserve the same left-to-right segment order as roster
//! names. A roster name may omit interior segments (middle names, initials)
//! but never the first or the last one, so matching requires the ends to
//! align and the interior to appear in order with gaps allowed.

use std::collections::HashMap;

use crate::{Error, Result};

// ─── Collision suffixing ─────────────────────────────────────────────────────

/// Width of the zero-padded numeric disambiguation suffix.
pub const SUFFIX_WIDTH: usize = 4;

/// The stored name for the `n`-th colliding duplicate (n >= 1).
pub fn suffixed(base: &str, n: u32) -> String {
  format!("{base} {n:0width$}", width = SUFFIX_WIDTH)
}

/// Strip a trailing 4-digit disambiguation suffix, if present.
pub fn strip_collision_suffix(name: &str) -> &str {
  match name.rsplit_once(' ') {
    Some((base, tail))
      if tail.len() == SUFFIX_WIDTH && tail.chars().all(|c| c.is_ascii_digit()) =>
    {
      base
    }
    _ => name,
  }
}

/// Tracks how many times each base name has been seen during ingestion and
/// hands out stored names: the first occurrence unsuffixed, later ones with a
/// strictly increasing zero-padded suffix, in document order.
///
/// Assignments are made once and never change for the life of the pipeline;
/// re-ingesting the same dump in the same order reproduces them exactly.
#[derive(Debug, Default)]
pub struct NameLedger {
  seen: HashMap<String, u32>,
}

impl NameLedger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Admit the next occurrence of `base` and return its stored name.
  pub fn admit(&mut self, base: &str) -> String {
    let n = self.seen.entry(base.to_owned()).or_insert(0);
    *n += 1;
    if *n == 1 {
      base.to_owned()
    } else {
      suffixed(base, *n - 1)
    }
  }
}

// ─── Segmentation ────────────────────────────────────────────────────────────

/// A name split into its ordered whitespace-delimited segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSegments {
  segments: Vec<String>,
}

impl NameSegments {
  pub fn parse(name: &str) -> Result<Self> {
    let segments: Vec<String> =
      name.split_whitespace().map(str::to_owned).collect();
    if segments.is_empty() {
      return Err(Error::EmptyName(name.to_owned()));
    }
    Ok(Self { segments })
  }

  pub fn len(&self) -> usize {
    self.segments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  pub fn first(&self) -> &str {
    &self.segments[0]
  }

  pub fn last(&self) -> &str {
    &self.segments[self.segments.len() - 1]
  }

  /// Everything strictly between the first and last segments.
  pub fn interior(&self) -> &[String] {
    if self.segments.len() <= 2 {
      &[]
    } else {
      &self.segments[1..self.segments.len() - 1]
    }
  }

  /// The LIKE-pattern stem of a segment: the segment with any trailing
  /// initial dot removed, so `"J."` narrows candidates to names starting
  /// with `J`.
  pub fn stem(segment: &str) -> &str {
    segment.strip_suffix('.').unwrap_or(segment)
  }
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// One roster segment matches one candidate segment if they are equal, or if
/// the roster segment is an initial (`"J."`) whose stem prefixes the
/// candidate (`"John"`).
fn segment_matches(input: &str, candidate: &str) -> bool {
  if input == candidate {
    return true;
  }
  if let Some(stem) = input.strip_suffix('.') {
    return !stem.is_empty() && candidate.starts_with(stem);
  }
  false
}

/// The segment-subsequence rule.
///
/// The first and last input segments must match the candidate's first and
/// last segments; any interior input segments must appear, in order, as a
/// (possibly non-contiguous) subsequence of the candidate's interior.
/// Reordered names never match: `"Doe J."` does not match `"John Doe"`.
pub fn matches_in_order(input: &NameSegments, candidate: &NameSegments) -> bool {
  if input.len() == 1 {
    return candidate.len() == 1 && segment_matches(input.first(), candidate.first());
  }
  if candidate.len() < 2 {
    return false;
  }
  if !segment_matches(input.first(), candidate.first())
    || !segment_matches(input.last(), candidate.last())
  {
    return false;
  }

  let mut remaining = candidate.interior().iter();
  'input: for seg in input.interior() {
    for cand in remaining.by_ref() {
      if segment_matches(seg, cand) {
        continue 'input;
      }
    }
    return false;
  }
  true
}

#[cfg(test)]
mod tests {
  use super::*;

  fn segs(s: &str) -> NameSegments {
    NameSegments::parse(s).unwrap()
  }

  #[test]
  fn parse_rejects_blank() {
    assert!(NameSegments::parse("   ").is_err());
  }

  #[test]
  fn initial_matches_full_name() {
    assert!(matches_in_order(&segs("J. Doe"), &segs("John Middle Doe")));
  }

  #[test]
  fn reversed_order_does_not_match() {
    assert!(!matches_in_order(&segs("Doe J."), &segs("John Middle Doe")));
  }

  #[test]
  fn interior_must_stay_in_order() {
    assert!(matches_in_order(&segs("John A. C. Doe"), &segs("John Adam Brown Carl Doe")));
    assert!(!matches_in_order(&segs("John C. A. Doe"), &segs("John Adam Brown Carl Doe")));
  }

  #[test]
  fn last_segment_must_align() {
    assert!(!matches_in_order(&segs("John Middle"), &segs("John Middle Doe")));
  }

  #[test]
  fn exact_name_matches_itself() {
    assert!(matches_in_order(&segs("Anne Canteaut"), &segs("Anne Canteaut")));
  }

  #[test]
  fn ledger_assigns_increasing_suffixes() {
    let mut ledger = NameLedger::new();
    assert_eq!(ledger.admit("Wei Wang"), "Wei Wang");
    assert_eq!(ledger.admit("Wei Wang"), "Wei Wang 0001");
    assert_eq!(ledger.admit("Wei Wang"), "Wei Wang 0002");
    assert_eq!(ledger.admit("Li Chen"), "Li Chen");
  }

  #[test]
  fn suffix_strip_is_inverse() {
    assert_eq!(strip_collision_suffix("Wei Wang 0001"), "Wei Wang");
    assert_eq!(strip_collision_suffix("Wei Wang"), "Wei Wang");
    // Not a suffix: wrong width.
    assert_eq!(strip_collision_suffix("Team 42"), "Team 42");
  }
}
