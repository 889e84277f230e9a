//! The `BibStore` trait — the typed query surface over the relational store.
//!
//! Implemented by storage backends (`bibnet-store-sqlite`). The resolver and
//! the relation builder depend on this abstraction, not on any concrete
//! backend. Every operation is read-only, returns fully-decoded records
//! (never raw squashed strings), and preserves storage row order. A lookup
//! with no matches returns an empty result, never an error.

use crate::record::{PersonRecord, PublicationRecord};

pub trait BibStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Structured lookups ────────────────────────────────────────────────

  /// All persons whose stored name equals `name` exactly.
  async fn person_by_name(&self, name: &str)
  -> Result<Vec<PersonRecord>, Self::Error>;

  /// Candidate persons whose stored name starts with `first_stem` and
  /// contains `last_stem` later on (LIKE `first%last%`, or just `first%`
  /// when the stems coincide, as they do for a single-segment name;
  /// tolerant of a trailing collision suffix). Returns every candidate —
  /// the resolver applies the exact segment rule and caps the result.
  async fn persons_matching(
    &self,
    first_stem: &str,
    last_stem: &str,
  ) -> Result<Vec<PersonRecord>, Self::Error>;

  /// Candidate persons whose alias collection contains a name starting with
  /// `first_stem` and containing `last_stem` later on. Same stem and
  /// completeness contract as [`BibStore::persons_matching`].
  async fn persons_alias_matching(
    &self,
    first_stem: &str,
    last_stem: &str,
  ) -> Result<Vec<PersonRecord>, Self::Error>;

  /// The publication with the given canonical key, if any.
  async fn publication_by_key(
    &self,
    key: &str,
  ) -> Result<Option<PublicationRecord>, Self::Error>;

  /// All publications listing `name` as a whole element of their author
  /// collection (the `%::X::%` containment pattern).
  async fn publications_by_author(
    &self,
    name: &str,
  ) -> Result<Vec<PublicationRecord>, Self::Error>;

  // ── Raw-filter escape hatch ───────────────────────────────────────────

  /// Evaluate a caller-supplied WHERE fragment against the `persons` table.
  ///
  /// The fragment is appended verbatim to a fixed SELECT template; this is a
  /// trusted-caller-only interface and performs no sanitisation. A
  /// syntactically invalid fragment surfaces as a query error.
  async fn raw_persons(
    &self,
    filter: &str,
    limit: usize,
  ) -> Result<Vec<PersonRecord>, Self::Error>;

  /// Evaluate a caller-supplied WHERE fragment against the `publications`
  /// table. Same trust model as [`BibStore::raw_persons`].
  async fn raw_publications(
    &self,
    filter: &str,
    limit: usize,
  ) -> Result<Vec<PublicationRecord>, Self::Error>;
}
