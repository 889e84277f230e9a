//! The two-stage fuzzy author-name resolver.

use bibnet_core::{
  name::{NameSegments, matches_in_order, strip_collision_suffix},
  record::PersonRecord,
  store::BibStore,
};

use crate::roster::RosterEntry;

// ─── Match types ─────────────────────────────────────────────────────────────

/// Confidence tier of a resolver match. Canonical-name matches rank above
/// alias matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
  Alias,
  Canonical,
}

#[derive(Debug, Clone)]
pub struct Match {
  pub person:     PersonRecord,
  pub confidence: Confidence,
}

// ─── Per-name resolution ─────────────────────────────────────────────────────

/// Resolve one dirty name against the store, returning up to `limit` matches
/// ranked by confidence.
///
/// When several suffixed variants of the same base name satisfy the segment
/// rule, all of them are surfaced; disambiguation is the caller's job, using
/// external signals such as home-page identity.
pub async fn resolve_name<S: BibStore>(
  store: &S,
  dirty: &str,
  limit: usize,
) -> Result<Vec<Match>, S::Error> {
  let Ok(input) = NameSegments::parse(dirty) else {
    return Ok(Vec::new());
  };
  let first = NameSegments::stem(input.first());
  let last = NameSegments::stem(input.last());

  // Stage 1: canonical names, suffix-stripped before the segment test. The
  // store returns the whole LIKE pool; the segment test does the narrowing,
  // so a true match can never be cut off by a fetch cap.
  let mut matches = Vec::new();
  for candidate in store.persons_matching(first, last).await? {
    if let Ok(segments) = NameSegments::parse(strip_collision_suffix(&candidate.name))
      && matches_in_order(&input, &segments)
    {
      matches.push(Match { person: candidate, confidence: Confidence::Canonical });
    }
  }

  // Stage 2: alias fallback, only when stage 1 found nothing.
  if matches.is_empty() {
    for candidate in store.persons_alias_matching(first, last).await? {
      let by_alias = candidate.aliases.iter().any(|alias| {
        NameSegments::parse(strip_collision_suffix(alias))
          .is_ok_and(|segments| matches_in_order(&input, &segments))
      });
      if by_alias {
        matches.push(Match { person: candidate, confidence: Confidence::Alias });
      }
    }
  }

  matches.truncate(limit);
  Ok(matches)
}

// ─── Roster resolution ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResolvedAuthor {
  pub entry:      RosterEntry,
  pub person:     PersonRecord,
  pub confidence: Confidence,
}

/// Outcome of resolving a whole (already deduplicated) roster. Produced
/// fresh per run; never persisted as canonical state.
#[derive(Debug, Default)]
pub struct Resolution {
  pub resolved:   Vec<ResolvedAuthor>,
  pub unresolved: Vec<RosterEntry>,
}

impl Resolution {
  pub fn unresolved_fraction(&self) -> f64 {
    let total = self.resolved.len() + self.unresolved.len();
    if total == 0 {
      return 0.0;
    }
    self.unresolved.len() as f64 / total as f64
  }

  /// The matched canonical persons, in roster order.
  pub fn persons(&self) -> Vec<PersonRecord> {
    self.resolved.iter().map(|r| r.person.clone()).collect()
  }
}

/// Resolve every roster entry, taking the best match per entry.
pub async fn resolve_roster<S: BibStore>(
  store: &S,
  entries: &[RosterEntry],
  limit: usize,
) -> Result<Resolution, S::Error> {
  let mut resolution = Resolution::default();

  for entry in entries {
    let matches = resolve_name(store, &entry.name, limit.max(1)).await?;
    match matches.into_iter().next() {
      Some(m) => {
        tracing::debug!(
          input = %entry.name,
          matched = %m.person.name,
          confidence = ?m.confidence,
          "resolved roster entry"
        );
        resolution.resolved.push(ResolvedAuthor {
          entry:      entry.clone(),
          person:     m.person,
          confidence: m.confidence,
        });
      }
      None => {
        tracing::debug!(input = %entry.name, "unresolved roster entry");
        resolution.unresolved.push(entry.clone());
      }
    }
  }

  tracing::info!(
    resolved = resolution.resolved.len(),
    unresolved = resolution.unresolved.len(),
    unresolved_fraction = resolution.unresolved_fraction(),
    "roster resolution complete"
  );
  Ok(resolution)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
