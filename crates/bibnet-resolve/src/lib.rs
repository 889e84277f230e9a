//! Resolution of a dirty external author roster against canonical store
//! entries.
//!
//! Two stages per name: an ordered segment-subsequence match on canonical
//! names, then the same test over each person's alias collection at lower
//! confidence. Zero matches is a valid, reportable outcome, aggregated into
//! the unresolved-fraction metric.

pub mod error;
pub mod resolver;
pub mod roster;

pub use error::{Error, Result};
pub use resolver::{Confidence, Match, Resolution, ResolvedAuthor, resolve_name, resolve_roster};
pub use roster::{
  RosterEntry, dedup_by_homepage, load_roster_xls, read_filtered_roster,
  write_filtered_roster,
};
