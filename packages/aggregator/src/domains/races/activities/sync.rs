//! Full pipeline run: fetch every source, reconcile, feed the catalog.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::domains::races::models::{RawRace, UpsertOutcome};
use crate::domains::races::reconcile::{reconcile, ReconcileOutcome, SkipReason};
use crate::domains::sources::{RaceSource, SOURCE_PRIORITY};

/// Counters for one sync run, mirrored into the closing log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub raw_records: usize,
    pub unparsable_dates: usize,
    pub duplicates_merged: usize,
    pub unique_races: usize,
    pub inserted: usize,
    pub updated: usize,
    pub store_errors: usize,
}

/// Fetch every source in order and feed the catalog.
///
/// A failing source is logged and contributes zero records; the run keeps
/// going. Raw records are snapshotted per source before reconciliation so a
/// later offline run can replay them.
pub async fn run_sync(
    config: &Config,
    sources: &[Box<dyn RaceSource>],
    pool: &SqlitePool,
) -> Result<SyncSummary> {
    let mut all_raw = Vec::new();
    let mut sources_ok = 0;
    let mut sources_failed = 0;

    for source in sources {
        info!(source = source.source_id(), "Fetching source");
        match source.fetch().await {
            Ok(records) => {
                info!(
                    source = source.source_id(),
                    count = records.len(),
                    "Source fetch complete"
                );
                if let Err(error) = write_snapshot(&config.data_dir, source.source_id(), &records)
                {
                    warn!(
                        source = source.source_id(),
                        error = %error,
                        "Failed to snapshot raw records"
                    );
                }
                all_raw.extend(records);
                sources_ok += 1;
            }
            Err(error) => {
                warn!(
                    source = source.source_id(),
                    error = %error,
                    "Source failed; contributing zero records"
                );
                sources_failed += 1;
            }
        }
    }

    reconcile_and_store(config, all_raw, sources_ok, sources_failed, pool).await
}

/// Replay the snapshots of a previous run without touching the network.
pub async fn run_sync_offline(config: &Config, pool: &SqlitePool) -> Result<SyncSummary> {
    let mut all_raw = Vec::new();
    let mut sources_ok = 0;
    let mut sources_failed = 0;

    for source_id in SOURCE_PRIORITY {
        match load_snapshot(&config.data_dir, source_id) {
            Ok(Some(records)) => {
                info!(source = source_id, count = records.len(), "Loaded snapshot");
                all_raw.extend(records);
                sources_ok += 1;
            }
            Ok(None) => {
                warn!(source = source_id, "No snapshot on disk; contributing zero records");
                sources_failed += 1;
            }
            Err(error) => {
                warn!(source = source_id, error = %error, "Failed to read snapshot");
                sources_failed += 1;
            }
        }
    }

    reconcile_and_store(config, all_raw, sources_ok, sources_failed, pool).await
}

async fn reconcile_and_store(
    config: &Config,
    raw: Vec<RawRace>,
    sources_ok: usize,
    sources_failed: usize,
    pool: &SqlitePool,
) -> Result<SyncSummary> {
    let raw_records = raw.len();
    let ReconcileOutcome { races, skipped } =
        reconcile(raw, config.similarity_threshold, &SOURCE_PRIORITY);

    let mut unparsable_dates = 0;
    let mut duplicates_merged = 0;
    for skip in &skipped {
        match &skip.reason {
            SkipReason::UnparsableDate { date_text } => {
                warn!(
                    title = %skip.title,
                    source = %skip.source_id,
                    date_text = %date_text,
                    "Dropping record with unparsable date"
                );
                unparsable_dates += 1;
            }
            SkipReason::DuplicateOf { kept_title, score } => {
                debug!(
                    title = %skip.title,
                    kept = %kept_title,
                    score,
                    "Merged same-date duplicate"
                );
                duplicates_merged += 1;
            }
        }
    }

    let unique_races = races.len();
    let mut inserted = 0;
    let mut updated = 0;
    let mut store_errors = 0;

    for race in &races {
        match race.upsert(pool).await {
            Ok(UpsertOutcome::Inserted) => inserted += 1,
            Ok(UpsertOutcome::Updated) => updated += 1,
            Err(error) => {
                error!(title = %race.title, error = %error, "Failed to store race");
                store_errors += 1;
            }
        }
    }

    let summary = SyncSummary {
        sources_ok,
        sources_failed,
        raw_records,
        unparsable_dates,
        duplicates_merged,
        unique_races,
        inserted,
        updated,
        store_errors,
    };

    info!(
        sources_ok = summary.sources_ok,
        sources_failed = summary.sources_failed,
        raw_records = summary.raw_records,
        unparsable_dates = summary.unparsable_dates,
        duplicates_merged = summary.duplicates_merged,
        unique_races = summary.unique_races,
        inserted = summary.inserted,
        updated = summary.updated,
        store_errors = summary.store_errors,
        "Sync run complete"
    );

    Ok(summary)
}

fn snapshot_path(data_dir: &Path, source_id: &str) -> PathBuf {
    data_dir.join(format!("{}.json", source_id.to_lowercase()))
}

/// Write one source's raw records to the data directory as JSON.
pub fn write_snapshot(data_dir: &Path, source_id: &str, records: &[RawRace]) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;
    let path = snapshot_path(data_dir, source_id);
    let json = serde_json::to_string_pretty(records).context("Failed to serialize snapshot")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), count = records.len(), "Wrote raw snapshot");
    Ok(())
}

/// Load a source snapshot. `None` when it has never been written.
pub fn load_snapshot(data_dir: &Path, source_id: &str) -> Result<Option<Vec<RawRace>>> {
    let path = snapshot_path(data_dir, source_id);
    if !path.exists() {
        return Ok(None);
    }
    let json =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(records))
}
