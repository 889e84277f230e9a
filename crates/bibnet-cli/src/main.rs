//! `bibnet` — the DBLP collaboration-network pipeline driver.
//!
//! The pipeline runs in stages, each persisting one artifact, and resumes
//! from whichever artifacts the invocation provides:
//!
//! ```
//! bibnet --xml dblp.xml.gz                      # ingest into dblp.sqlite
//! bibnet --xls roster.xlsx                      # resolve + build relations
//! bibnet --csv filtered.csv                     # resume from filtered roster
//! bibnet --xml dblp.xml.gz --xls roster.xlsx    # full run
//! ```

mod stages;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use bibnet_relations::YearRange;
use stages::{StagePaths, Tunables, run_pipeline};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bibnet", about = "DBLP collaboration network pipeline")]
struct Args {
  /// Path to the DBLP XML dump (`.xml` or `.xml.gz`); triggers ingestion.
  #[arg(long, value_name = "FILE")]
  xml: Option<PathBuf>,

  /// Path of the SQLite store artifact.
  #[arg(long, value_name = "FILE", env = "BIBNET_SQLITE", default_value = "dblp.sqlite")]
  sqlite: PathBuf,

  /// Raw roster spreadsheet with `name` and `dblp` columns.
  #[arg(long, value_name = "FILE")]
  xls: Option<PathBuf>,

  /// Previously filtered roster CSV; skips resolution.
  #[arg(long, value_name = "FILE")]
  csv: Option<PathBuf>,

  /// Output path for the filtered roster artifact.
  #[arg(long, value_name = "FILE", default_value = "filtered.csv")]
  filtered: PathBuf,

  /// Output path for the temporal relation table.
  #[arg(long, value_name = "FILE", default_value = "temporal_rels.csv")]
  relations: PathBuf,

  /// Elements per ingestion transaction.
  #[arg(long)]
  batch_size: Option<usize>,

  /// First year band of the relation table.
  #[arg(long)]
  min_year: Option<u32>,

  /// Last year band of the relation table (default: current year).
  #[arg(long)]
  max_year: Option<u32>,

  /// Maximum matches surfaced per roster name.
  #[arg(long)]
  limit: Option<usize>,

  /// Path to a TOML config file (batch_size, min_year, max_year, limit).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  batch_size: Option<usize>,
  min_year:   Option<u32>,
  max_year:   Option<u32>,
  limit:      Option<usize>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided; CLI flags override it.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let defaults = YearRange::default();
  let range = YearRange::new(
    args.min_year.or(file_cfg.min_year).unwrap_or(defaults.min),
    args.max_year.or(file_cfg.max_year).unwrap_or(defaults.max),
  );

  let paths = StagePaths {
    xml:           args.xml,
    sqlite:        args.sqlite,
    xls:           args.xls,
    csv:           args.csv,
    filtered_out:  args.filtered,
    relations_out: args.relations,
  };
  let tunables = Tunables {
    batch_size: args.batch_size.or(file_cfg.batch_size).unwrap_or(1000),
    limit:      args.limit.or(file_cfg.limit).unwrap_or(4),
    range,
  };

  run_pipeline(&paths, &tunables).await
}
