//! Flat-file snapshot persistence.
//!
//! Every snapshot is one self-describing JSON file named after its id
//! (`YYYYMMDD_HHMMSS_SYMBOL_interval.json`); the directory itself is the
//! dataset. An `index.json` summarising the directory can be regenerated
//! at any time from the files on disk.

use chrono::{DateTime, Utc};
use core_types::{Candle, Snapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod error;

pub use error::StoreError;

/// Builds a snapshot from freshly captured candles, stamped with the
/// capture time. The id combines timestamp, symbol and interval so ids
/// stay unique and sort chronologically as filenames.
pub fn new_snapshot(symbol: &str, interval: &str, candles: Vec<Candle>) -> Snapshot {
    let now = Utc::now();
    Snapshot {
        id: format!("{}_{}_{}", now.format("%Y%m%d_%H%M%S"), symbol, interval),
        symbol: symbol.to_string(),
        interval: interval.to_string(),
        timestamp: now.timestamp_millis(),
        candles,
    }
}

/// Writes a snapshot into `dir`, creating the directory if needed.
pub fn save_snapshot(snapshot: &Snapshot, dir: &Path) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.json", snapshot.id));
    let data = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, data)?;

    debug!(path = %path.display(), "saved snapshot");
    Ok(path)
}

/// Reads a single snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Loads every readable snapshot in `dir`, newest first.
///
/// Files that are not `.json` or fail to decode are skipped rather than
/// failing the whole load; a dataset directory with one corrupt file still
/// yields a usable benchmark.
pub fn load_snapshots(dir: &Path) -> Result<Vec<Snapshot>, StoreError> {
    let mut snapshots = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some("index.json") {
            continue;
        }

        match load_snapshot(&path) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable snapshot");
            }
        }
    }

    snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(snapshots)
}

/// Metadata about the snapshots available in a dataset directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotIndex {
    pub updated_at: DateTime<Utc>,
    pub snapshots: Vec<SnapshotMetadata>,
}

/// Index entry for a single snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub id: String,
    pub symbol: String,
    pub interval: String,
    pub timestamp: i64,
    pub filepath: String,
}

/// Regenerates `index.json` from the snapshot files currently in `dir`.
pub fn update_index(dir: &Path) -> Result<SnapshotIndex, StoreError> {
    let snapshots = load_snapshots(dir)?;

    let index = SnapshotIndex {
        updated_at: Utc::now(),
        snapshots: snapshots
            .iter()
            .map(|s| SnapshotMetadata {
                id: s.id.clone(),
                symbol: s.symbol.clone(),
                interval: s.interval.clone(),
                timestamp: s.timestamp,
                filepath: format!("{}.json", s.id),
            })
            .collect(),
    };

    let data = serde_json::to_string_pretty(&index)?;
    fs::write(dir.join("index.json"), data)?;

    Ok(index)
}
