//! Key-value backends
//!
//! Keys and values are plain strings, mirroring browser local storage.
//! Entries live in a `BTreeMap` so the on-disk encoding is deterministic.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },

    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),
}

/// String key-value storage shared behind `&self`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ── Memory ──────────────────────────────────────────────────────────

/// Process-local store. Used in tests and when no data dir is set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// ── File ────────────────────────────────────────────────────────────

/// On-disk layout of a store file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoreFile {
    entries: BTreeMap<String, String>,
    checksum: String,
}

fn compute_checksum(entries: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in entries {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// JSON file store. Reads once on open, rewrites the whole file on
/// every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open or create. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            Self::load(&path)?
        } else {
            BTreeMap::new()
        };
        info!(path = %path.display(), entries = entries.len(), "Opened flag store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
        let data = fs::read(path)?;
        let file: StoreFile = serde_json::from_slice(&data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let actual = compute_checksum(&file.entries);
        if actual != file.checksum {
            return Err(StoreError::IntegrityFailure {
                expected: file.checksum,
                actual,
            });
        }
        Ok(file.entries)
    }

    /// Atomic write: tmp file, fsync, rename.
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let file = StoreFile {
            entries: entries.clone(),
            checksum: compute_checksum(entries),
        };
        let data = serde_json::to_vec_pretty(&file)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        {
            let mut out = File::create(&tmp_path)?;
            out.write_all(&data)?;
            out.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), entries = entries.len(), "Flag store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        if entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("wm_lang").unwrap().is_none());

        store.set("wm_lang", "ja").unwrap();
        assert_eq!(store.get("wm_lang").unwrap().as_deref(), Some("ja"));

        store.remove("wm_lang").unwrap();
        store.remove("wm_lang").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.set("wm_lang", "de").unwrap();
            store.set("wm_connected", "1").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("wm_lang").unwrap().as_deref(), Some("de"));
        assert_eq!(reopened.get("wm_connected").unwrap().as_deref(), Some("1"));

        reopened.remove("wm_connected").unwrap();
        let again = FileStore::open(&path).unwrap();
        assert!(again.get("wm_connected").unwrap().is_none());
    }

    #[test]
    fn test_file_store_creates_parent_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dir").join("flags.json");
        let store = FileStore::open(&path).unwrap();
        store.set("wm_lang", "fr").unwrap();
        assert!(path.exists());
        assert!(!tmp.path().join("nested/dir/flags.json.tmp").exists());
    }

    #[test]
    fn test_tampered_file_detected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        FileStore::open(&path).unwrap().set("wm_lang", "ko").unwrap();

        let text = fs::read_to_string(&path).unwrap().replace("\"ko\"", "\"ru\"");
        fs::write(&path, text).unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::IntegrityFailure { .. })
        ));
    }

    #[test]
    fn test_garbage_file_is_serialization_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_checksum_deterministic() {
        let mut a = BTreeMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = BTreeMap::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());
        assert_eq!(compute_checksum(&a), compute_checksum(&b));
    }
}
