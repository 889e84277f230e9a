//! SQL schema for the bibnet SQLite store.
//!
//! Multi-valued attributes (authors, citations, aliases) are stored squashed
//! — see `bibnet_core::squash`. Indexes are created separately, after bulk
//! ingestion, so batch inserts stay cheap.

/// Table DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS publications (
    key       TEXT PRIMARY KEY,  -- canonical DTD key path
    kind      TEXT NOT NULL,     -- source element tag
    mdate     TEXT,
    publtype  TEXT,
    year      INTEGER,
    authors   TEXT NOT NULL DEFAULT '',  -- squashed, document order
    citations TEXT NOT NULL DEFAULT '',  -- squashed, placeholder-filtered
    publisher TEXT,
    school    TEXT
);

CREATE TABLE IF NOT EXISTS persons (
    name    TEXT NOT NULL,       -- unique after collision suffixing
    profile TEXT,                -- home-page key path; unique when present
    aliases TEXT NOT NULL DEFAULT ''
);

PRAGMA user_version = 1;
";

/// Dropped and re-run by a fresh ingestion so re-ingesting overwrites
/// deterministically.
pub const DROP: &str = "
DROP TABLE IF EXISTS publications;
DROP TABLE IF EXISTS persons;
";

/// Built once, after the last batch commits.
pub const INDEXES: &str = "
CREATE INDEX IF NOT EXISTS persons_name_idx ON persons(name);
CREATE UNIQUE INDEX IF NOT EXISTS persons_profile_idx ON persons(profile);
CREATE INDEX IF NOT EXISTS publications_year_idx ON publications(year);
CREATE INDEX IF NOT EXISTS publications_authors_idx ON publications(authors);
CREATE INDEX IF NOT EXISTS publications_citations_idx ON publications(citations);
";
