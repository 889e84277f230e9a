//! [`SqliteStore`] — the SQLite implementation of [`BibStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use bibnet_core::{
  record::{PersonRecord, PublicationRecord},
  squash::{DELIMITER, containment_pattern, squash},
  store::BibStore,
};

use crate::{
  Error, Result,
  encode::{RawPerson, RawPublication},
  schema::{DROP, INDEXES, SCHEMA},
};

const PUBLICATION_COLUMNS: &str =
  "key, kind, mdate, publtype, year, authors, citations, publisher, school";
const PERSON_COLUMNS: &str = "name, profile, aliases";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A bibnet store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Drop and recreate both tables. A fresh ingestion starts here so that
  /// re-running the stage overwrites its artifact deterministically.
  pub async fn reset(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(DROP)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Persist one ingestion batch in a single transaction. Either the whole
  /// batch commits or none of it does.
  pub async fn insert_batch(
    &self,
    publications: Vec<PublicationRecord>,
    persons: Vec<PersonRecord>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare_cached(
            "INSERT OR REPLACE INTO publications
               (key, kind, mdate, publtype, year, authors, citations, publisher, school)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for record in &publications {
            stmt.execute(rusqlite::params![
              record.key,
              record.kind.as_str(),
              record.mdate,
              record.publtype,
              record.year.map(|y| y as i64),
              squash(&record.authors),
              squash(&record.citations),
              record.publisher,
              record.school,
            ])?;
          }
        }
        {
          let mut stmt = tx.prepare_cached(
            "INSERT INTO persons (name, profile, aliases) VALUES (?1, ?2, ?3)",
          )?;
          for record in &persons {
            stmt.execute(rusqlite::params![
              record.name,
              record.profile,
              squash(&record.aliases),
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Build the query indexes. Run once, after the final batch commits.
  ///
  /// Fails if the dump violated profile uniqueness — a data error that makes
  /// the whole ingestion invalid.
  pub async fn create_indexes(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(INDEXES)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_persons(
    &self,
    where_clause: String,
    params: Vec<Box<dyn rusqlite::ToSql + Send>>,
  ) -> Result<Vec<PersonRecord>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE {where_clause}");
        let mut stmt = conn.prepare(&sql)?;
        let refs: Vec<&dyn rusqlite::ToSql> =
          params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect();
        let rows = stmt
          .query_map(refs.as_slice(), |row| {
            Ok(RawPerson {
              name:    row.get(0)?,
              profile: row.get(1)?,
              aliases: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawPerson::into_record).collect())
  }

  async fn select_publications(
    &self,
    where_clause: String,
    params: Vec<Box<dyn rusqlite::ToSql + Send>>,
  ) -> Result<Vec<PublicationRecord>> {
    let raws: Vec<RawPublication> = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {PUBLICATION_COLUMNS} FROM publications WHERE {where_clause}");
        let mut stmt = conn.prepare(&sql)?;
        let refs: Vec<&dyn rusqlite::ToSql> =
          params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect();
        let rows = stmt
          .query_map(refs.as_slice(), |row| {
            Ok(RawPublication {
              key:       row.get(0)?,
              kind:      row.get(1)?,
              mdate:     row.get(2)?,
              publtype:  row.get(3)?,
              year:      row.get(4)?,
              authors:   row.get(5)?,
              citations: row.get(6)?,
              publisher: row.get(7)?,
              school:    row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| raw.into_record())
      .collect::<Result<Vec<_>>>()
  }
}

// ─── BibStore impl ───────────────────────────────────────────────────────────

impl BibStore for SqliteStore {
  type Error = Error;

  async fn person_by_name(&self, name: &str) -> Result<Vec<PersonRecord>> {
    self
      .select_persons("name = ?1".into(), vec![Box::new(name.to_owned())])
      .await
  }

  async fn persons_matching(
    &self,
    first_stem: &str,
    last_stem: &str,
  ) -> Result<Vec<PersonRecord>> {
    // Trailing % tolerates the 4-digit collision suffix. Equal stems mean a
    // single-segment name, which must not be required to repeat.
    let pattern = if first_stem == last_stem {
      format!("{first_stem}%")
    } else {
      format!("{first_stem}%{last_stem}%")
    };
    self
      .select_persons("name LIKE ?1".into(), vec![Box::new(pattern)])
      .await
  }

  async fn persons_alias_matching(
    &self,
    first_stem: &str,
    last_stem: &str,
  ) -> Result<Vec<PersonRecord>> {
    // An alias starts right after a delimiter; anything this over-matches is
    // discarded by the resolver's exact segment test.
    let pattern = if first_stem == last_stem {
      format!("%{DELIMITER}{first_stem}%")
    } else {
      format!("%{DELIMITER}{first_stem}%{last_stem}%")
    };
    self
      .select_persons("aliases LIKE ?1".into(), vec![Box::new(pattern)])
      .await
  }

  async fn publication_by_key(&self, key: &str) -> Result<Option<PublicationRecord>> {
    let key = key.to_owned();
    let raw: Option<RawPublication> = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {PUBLICATION_COLUMNS} FROM publications WHERE key = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], |row| {
              Ok(RawPublication {
                key:       row.get(0)?,
                kind:      row.get(1)?,
                mdate:     row.get(2)?,
                publtype:  row.get(3)?,
                year:      row.get(4)?,
                authors:   row.get(5)?,
                citations: row.get(6)?,
                publisher: row.get(7)?,
                school:    row.get(8)?,
              })
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPublication::into_record).transpose()
  }

  async fn publications_by_author(
    &self,
    name: &str,
  ) -> Result<Vec<PublicationRecord>> {
    self
      .select_publications(
        "authors LIKE ?1".into(),
        vec![Box::new(containment_pattern(name))],
      )
      .await
  }

  async fn raw_persons(&self, filter: &str, limit: usize) -> Result<Vec<PersonRecord>> {
    // Trusted-caller-only: the fragment is appended verbatim. Invalid SQL
    // surfaces as Error::Database from statement preparation.
    self
      .select_persons(format!("{filter} LIMIT ?1"), vec![Box::new(limit as i64)])
      .await
  }

  async fn raw_publications(
    &self,
    filter: &str,
    limit: usize,
  ) -> Result<Vec<PublicationRecord>> {
    self
      .select_publications(format!("{filter} LIMIT ?1"), vec![Box::new(limit as i64)])
      .await
  }
}
