//! Persistence for the two synchronized store representations.
//!
//! The structured file carries the schema wrapper and provenance and is the
//! source of truth. The flat file is a bare array with provenance stripped,
//! consumed by the presentation layer. Both are written on every successful
//! import so they never diverge; a crash between the two writes is caught by
//! the validator's cross-representation check on the next run.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::config::{SCHEMA_VERSION, StorePaths};
use crate::models::PosterRecord;

/// The structured representation: schema wrapper + provenance-bearing records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosterStore {
    pub schema_version: String,
    pub last_updated: DateTime<Utc>,
    pub posters: Vec<PosterRecord>,
}

impl PosterStore {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            last_updated: now,
            posters: Vec::new(),
        }
    }

    pub fn new(posters: Vec<PosterRecord>, now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            last_updated: now,
            posters,
        }
    }
}

/// Load a store file. A missing file is an empty store (first import starts
/// fresh); a bare-array file is transparently upgraded into the structured
/// shape in memory.
pub fn load_store(path: &Path, now: DateTime<Utc>) -> Result<PosterStore, StoreError> {
    if !path.exists() {
        tracing::info!(file = %path.display(), "No existing store, starting fresh");
        return Ok(PosterStore::empty(now));
    }

    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| StoreError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let store = if value.is_array() {
        let posters: Vec<PosterRecord> =
            serde_json::from_value(value).map_err(|e| StoreError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        PosterStore::new(posters, now)
    } else {
        serde_json::from_value(value).map_err(|e| StoreError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    };

    tracing::info!(
        file = %path.display(),
        posters = store.posters.len(),
        "Loaded existing store"
    );
    Ok(store)
}

/// Write both representations as one logical commit: structured first, then
/// flat with provenance stripped. Each file lands atomically via a sibling
/// temp file and rename.
pub fn save_store(paths: &StorePaths, store: &PosterStore) -> Result<(), StoreError> {
    let structured_path = paths.structured_store();
    write_json_atomic(&structured_path, store)?;
    tracing::info!(file = %structured_path.display(), "Wrote structured store");

    let flat: Vec<PosterRecord> = store
        .posters
        .iter()
        .map(PosterRecord::without_provenance)
        .collect();
    let flat_path = paths.flat_store();
    write_json_atomic(&flat_path, &flat)?;
    tracing::info!(file = %flat_path.display(), "Wrote flat store");

    Ok(())
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| StoreError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
