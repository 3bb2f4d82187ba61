//! Ledger cache: decoded, classified record sets keyed by kind for one run.
//!
//! Entries are write-once. Persisting writes every table into a staging
//! directory first and swaps it into place, so a failed run never leaves a
//! half-written cache behind. [`stage`] and [`StagedDir::commit`] split the
//! two steps when the swap has to wait for other outputs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use padconv_core::{RecordSet, Table};

use crate::error::CacheError;
use crate::stage::{staging_path, StagedDir};

#[derive(Debug, Default)]
pub struct LedgerCache {
    sets: BTreeMap<String, RecordSet>,
}

impl LedgerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    /// Publish a record set. A kind can be published only once per run.
    pub fn insert(&mut self, set: RecordSet) -> Result<(), CacheError> {
        if self.sets.contains_key(&set.kind) {
            return Err(CacheError::AlreadyWritten(set.kind));
        }
        log::debug!("cache: {} ({} rows)", set.kind, set.len());
        self.sets.insert(set.kind.clone(), set);
        Ok(())
    }

    pub fn get(&self, kind: &str) -> Option<&RecordSet> {
        self.sets.get(kind)
    }

    pub fn require(&self, kind: &str) -> Result<&RecordSet, CacheError> {
        self.get(kind).ok_or_else(|| CacheError::Missing(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.sets.contains_key(kind)
    }

    /// Kinds in name order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Every cached set flattened into a stamped table, in kind order.
    pub fn tables(&self) -> Vec<Table> {
        self.sets.values().map(RecordSet::to_table).collect()
    }
}

fn io_err(path: &Path, e: std::io::Error) -> CacheError {
    CacheError::Io(format!("{}: {}", path.display(), e))
}

/// Remove a previous run's cache (and any abandoned staging directory).
pub fn clear_dir(dir: &Path) -> Result<(), CacheError> {
    for path in [dir.to_path_buf(), staging_path(dir)] {
        if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
        }
    }
    Ok(())
}

/// Write `tables` as `<dir>.staging/<NAME>.json`. Nothing is visible at
/// `dir` until the returned stage is committed.
pub fn stage(dir: &Path, tables: &[Table]) -> Result<StagedDir, CacheError> {
    let staged = StagedDir::create(dir).map_err(|e| io_err(&staging_path(dir), e))?;
    for table in tables {
        let path = staged.path().join(format!("{}.json", table.name));
        let json = serde_json::to_vec(table).map_err(|e| CacheError::Serialize(e.to_string()))?;
        fs::write(&path, json).map_err(|e| io_err(&path, e))?;
    }
    Ok(staged)
}

/// Write `tables` as `<dir>/<NAME>.json`, replacing whatever was there.
pub fn persist(dir: &Path, tables: &[Table]) -> Result<(), CacheError> {
    stage(dir, tables)?.commit().map_err(|e| io_err(dir, e))?;
    log::debug!("cache persisted to {} ({} tables)", dir.display(), tables.len());
    Ok(())
}

/// Read one persisted table back.
pub fn load(dir: &Path, name: &str) -> Result<Table, CacheError> {
    let path = dir.join(format!("{name}.json"));
    if !path.is_file() {
        return Err(CacheError::Missing(name.to_string()));
    }
    let bytes = fs::read(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialize(e.to_string()))
}
