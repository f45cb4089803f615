//! Fingerprint store trait and filesystem backend

use crate::record::{FingerprintRecord, TrackInfo};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use wavemark_core::HashTriple;

// Disambiguates temp files written by threads of the same process
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("fingerprint record not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed fingerprint record: {0}")]
    Format(#[from] serde_json::Error),
}

/// Read/write access to the track-key -> fingerprint mapping.
///
/// Implementations must tolerate concurrent readers plus one writer per
/// key; content-hash keys make duplicate writes idempotent.
pub trait FingerprintStore: Send + Sync {
    /// Persist a fingerprint under `key`. Writing an existing key again is
    /// last-writer-wins with identical content.
    fn put(&self, key: &str, triples: &[HashTriple], info: &TrackInfo) -> Result<(), StoreError>;

    /// Fetch one fingerprint; `Ok(None)` when the key is unknown
    fn get(&self, key: &str) -> Result<Option<Vec<HashTriple>>, StoreError>;

    /// All stored track keys, in unspecified order
    fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Directory of one JSON record per track key
pub struct FsStore {
    base_dir: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed
    pub fn open(base_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(base_dir)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }

    /// Load every readable record as (key, fingerprint) pairs, in
    /// parallel. A record that fails to load is logged and skipped; that
    /// track simply cannot match.
    pub fn load_all(&self) -> Result<Vec<(String, Vec<HashTriple>)>, StoreError> {
        let keys = self.list_keys()?;

        let loaded: Vec<(String, Vec<HashTriple>)> = keys
            .par_iter()
            .filter_map(|key| match FingerprintRecord::load(&self.record_path(key)) {
                Ok(record) => Some((key.clone(), record.triples)),
                Err(e) => {
                    log::warn!("skipping unreadable record {}: {}", key, e);
                    None
                }
            })
            .collect();

        Ok(loaded)
    }
}

impl FingerprintStore for FsStore {
    fn put(&self, key: &str, triples: &[HashTriple], info: &TrackInfo) -> Result<(), StoreError> {
        let record = FingerprintRecord::new(key, triples.to_vec(), info);

        // Write via a sibling temp file and rename so readers never see a
        // partial record. The temp name carries the pid and a process-wide
        // sequence number; concurrent writers of the same key each rename
        // their own file, last writer wins.
        let final_path = self.record_path(key);
        let tmp_path = self.base_dir.join(format!(
            "{}.json.tmp-{}-{}",
            key,
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        record.save(&tmp_path)?;
        std::fs::rename(&tmp_path, &final_path)?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<HashTriple>>, StoreError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let record = FingerprintRecord::load(&path)?;
        Ok(Some(record.triples))
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let is_record = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| ext == "json")
                .unwrap_or(false);
            if is_record {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}
