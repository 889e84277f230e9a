//! Stage orchestration.
//!
//! Each stage persists one artifact and the pipeline resumes from whichever
//! artifacts an invocation provides: the XML dump feeds the SQLite store,
//! the roster spreadsheet feeds the filtered-roster CSV, and the filtered
//! roster feeds the temporal relation table. Starting a stage whose input
//! artifact is missing is a fatal startup error rather than a silent no-op.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use bibnet_core::record::PersonRecord;
use bibnet_relations::{YearRange, build_relations, write_relations_csv};
use bibnet_resolve::{dedup_by_homepage, load_roster_xls, read_filtered_roster, resolve_roster, write_filtered_roster};
use bibnet_store_sqlite::{SqliteStore, ingest_dump};

/// Input and output artifact locations for one pipeline run.
pub struct StagePaths {
  pub xml:           Option<PathBuf>,
  pub sqlite:        PathBuf,
  pub xls:           Option<PathBuf>,
  pub csv:           Option<PathBuf>,
  pub filtered_out:  PathBuf,
  pub relations_out: PathBuf,
}

pub struct Tunables {
  pub batch_size: usize,
  pub limit:      usize,
  pub range:      YearRange,
}

/// Run every stage the provided artifacts select.
pub async fn run_pipeline(paths: &StagePaths, tunables: &Tunables) -> Result<()> {
  let store = open_store(paths, tunables).await?;

  let authors = match roster_authors(paths, tunables, &store).await? {
    Some(authors) => authors,
    // Ingestion-only invocation; roster stages run later from the store.
    None => return Ok(()),
  };
  if authors.is_empty() {
    bail!("no roster authors resolved; nothing to build relations for");
  }

  let relations = build_relations(&store, &authors, tunables.range)
    .await
    .context("building temporal relations")?;
  write_relations_csv(&relations, &paths.relations_out)
    .with_context(|| format!("writing {}", paths.relations_out.display()))?;
  Ok(())
}

/// Open the store, ingesting the dump first when one is provided.
async fn open_store(paths: &StagePaths, tunables: &Tunables) -> Result<SqliteStore> {
  match &paths.xml {
    Some(xml) => {
      let store = SqliteStore::open(&paths.sqlite)
        .await
        .with_context(|| format!("opening store {}", paths.sqlite.display()))?;
      let report = ingest_dump(&store, xml, tunables.batch_size)
        .await
        .with_context(|| format!("ingesting dump {}", xml.display()))?;
      tracing::info!(
        publications = report.publications,
        persons = report.persons,
        skipped = report.skipped,
        "dump ingested"
      );
      Ok(store)
    }
    None => {
      if !paths.sqlite.exists() {
        bail!(
          "store {} does not exist; run an ingestion with --xml first",
          paths.sqlite.display()
        );
      }
      SqliteStore::open(&paths.sqlite)
        .await
        .with_context(|| format!("opening store {}", paths.sqlite.display()))
    }
  }
}

/// Produce the resolved author list, from whichever roster artifact was
/// given. `None` means no roster stage was requested at all.
async fn roster_authors(
  paths: &StagePaths,
  tunables: &Tunables,
  store: &SqliteStore,
) -> Result<Option<Vec<PersonRecord>>> {
  if let Some(csv) = &paths.csv {
    let persons = read_filtered_roster(csv)
      .with_context(|| format!("reading filtered roster {}", csv.display()))?;
    return Ok(Some(persons));
  }

  let Some(xls) = &paths.xls else {
    if paths.xml.is_some() {
      return Ok(None);
    }
    bail!("nothing to do: provide --xml, --xls, or --csv");
  };

  let entries = dedup_by_homepage(
    load_roster_xls(xls).with_context(|| format!("loading roster {}", xls.display()))?,
  );
  let resolution = resolve_roster(store, &entries, tunables.limit)
    .await
    .context("resolving roster")?;
  for entry in &resolution.unresolved {
    tracing::warn!(name = %entry.name, "roster entry did not resolve");
  }
  tracing::info!(
    resolved = resolution.resolved.len(),
    unresolved = resolution.unresolved.len(),
    unresolved_fraction = resolution.unresolved_fraction(),
    "roster resolution finished"
  );

  let persons = resolution.persons();
  write_filtered_roster(&persons, &paths.filtered_out)
    .with_context(|| format!("writing {}", paths.filtered_out.display()))?;
  Ok(Some(persons))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use bibnet_resolve::Confidence;
  use bibnet_store_sqlite::ingest_batches;
  use bibnet_xml::ElementBatches;

  use super::*;

  const DUMP: &str = r#"<?xml version="1.0"?>
<dblp>
  <article key="journals/x/DoeS00" mdate="2020-01-01">
    <author>John Middle Doe</author>
    <author>Alice Smith</author>
    <year>2000</year>
  </article>
  <inproceedings key="conf/y/DoeS01">
    <author>John Middle Doe</author>
    <author>Alice Smith</author>
    <year>2001</year>
  </inproceedings>
  <www key="homepages/d/JohnDoe">
    <title>Home Page</title>
    <author>John Middle Doe</author>
    <author>Johnny Doe</author>
  </www>
</dblp>"#;

  async fn ingested_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let batches = ElementBatches::from_reader(Cursor::new(DUMP.as_bytes()), 100);
    ingest_batches(&store, batches).await.unwrap();
    store
  }

  #[tokio::test]
  async fn alias_roster_entry_yields_relation_row() {
    let store = ingested_store().await;

    // "Johnny Doe" is not a prefix-compatible canonical match, so only the
    // alias stage can resolve it.
    let entries = vec![bibnet_resolve::RosterEntry {
      name:     "Johnny Doe".into(),
      homepage: "homepages/d/JohnDoe".into(),
    }];
    let resolution = resolve_roster(&store, &entries, 4).await.unwrap();
    assert_eq!(resolution.resolved.len(), 1);
    assert_eq!(resolution.resolved[0].person.name, "John Middle Doe");
    assert_eq!(resolution.resolved[0].confidence, Confidence::Alias);
    assert!(resolution.unresolved.is_empty());

    let relations = build_relations(
      &store,
      &resolution.persons(),
      YearRange::new(2000, 2001),
    )
    .await
    .unwrap();

    assert_eq!(relations.rows.len(), 1);
    let row = &relations.rows[0];
    assert_eq!(row.author, "John Middle Doe");
    assert_eq!(row.cells[0], vec!["Alice Smith"]);
    assert_eq!(row.cells[1], vec!["Alice Smith"]);
  }

  #[tokio::test]
  async fn filtered_roster_survives_a_restart() {
    let store = ingested_store().await;
    let entries = vec![bibnet_resolve::RosterEntry {
      name:     "J. Doe".into(),
      homepage: "homepages/d/JohnDoe".into(),
    }];
    let resolution = resolve_roster(&store, &entries, 4).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let filtered = dir.path().join("filtered.csv");
    write_filtered_roster(&resolution.persons(), &filtered).unwrap();

    let reread = read_filtered_roster(&filtered).unwrap();
    assert_eq!(reread.len(), 1);
    assert_eq!(reread[0].name, "John Middle Doe");
    assert_eq!(reread[0].profile.as_deref(), Some("homepages/d/JohnDoe"));
    assert!(reread[0].aliases.contains(&"Johnny Doe".to_string()));
  }

  #[tokio::test]
  async fn pipeline_runs_from_dump_to_relation_table() {
    let dir = tempfile::tempdir().unwrap();
    let xml = dir.path().join("dump.xml");
    std::fs::write(&xml, DUMP).unwrap();

    let sqlite = dir.path().join("dblp.sqlite");
    let filtered = dir.path().join("filtered.csv");
    let relations = dir.path().join("temporal_rels.csv");

    // First invocation: ingestion only.
    let paths = StagePaths {
      xml:           Some(xml),
      sqlite:        sqlite.clone(),
      xls:           None,
      csv:           None,
      filtered_out:  filtered.clone(),
      relations_out: relations.clone(),
    };
    let tunables = Tunables {
      batch_size: 100,
      limit:      4,
      range:      YearRange::new(2000, 2001),
    };
    run_pipeline(&paths, &tunables).await.unwrap();
    assert!(sqlite.exists());
    assert!(!relations.exists());

    // Write the filtered roster by hand, as a resolution run would have.
    write_filtered_roster(
      &[PersonRecord {
        name:    "John Middle Doe".into(),
        profile: Some("homepages/d/JohnDoe".into()),
        aliases: vec!["Johnny Doe".into()],
      }],
      &filtered,
    )
    .unwrap();

    // Second invocation: resume from the filtered roster.
    let paths = StagePaths { xml: None, csv: Some(filtered), ..paths };
    run_pipeline(&paths, &tunables).await.unwrap();

    let mut reader = csv::ReaderBuilder::new().from_path(&relations).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.iter().collect::<Vec<_>>(), ["author", "2000", "2001"]);
    let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "John Middle Doe");
    assert_eq!(&rows[0][1], "::Alice Smith::");
  }

  #[tokio::test]
  async fn missing_store_without_dump_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StagePaths {
      xml:           None,
      sqlite:        dir.path().join("absent.sqlite"),
      xls:           None,
      csv:           Some(dir.path().join("filtered.csv")),
      filtered_out:  dir.path().join("filtered.csv"),
      relations_out: dir.path().join("temporal_rels.csv"),
    };
    let tunables =
      Tunables { batch_size: 100, limit: 4, range: YearRange::default() };

    let err = run_pipeline(&paths, &tunables).await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));
  }
}
