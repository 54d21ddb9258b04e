//! File Storage Module
//!
//! Persistent key/value store backed by a single JSON file. The whole map is
//! rewritten after every mutation, which suits the small, write-rarely
//! workload of a response cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::{check_quota, entry_size, Storage};

// == File Storage ==
/// Storage persisted to a JSON file on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl FileStorage {
    // == Constructor ==
    /// Opens the store at `path`, loading existing entries.
    ///
    /// A missing file starts empty; an unreadable or corrupt file is logged
    /// and also starts empty.
    pub fn open(path: impl Into<PathBuf>, quota: Option<usize>) -> Self {
        let path = path.into();
        let entries = Self::load_from_disk(&path);
        debug!(path = %path.display(), entries = entries.len(), "File storage opened");
        Self {
            path,
            entries: Mutex::new(entries),
            quota,
        }
    }

    /// Default location: `<platform cache dir>/local_cache/storage.json`.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("local_cache")
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn load_from_disk(path: &Path) -> HashMap<String, String> {
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Storage file is corrupt, starting empty: {}", e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read storage file, starting empty: {}", e);
                HashMap::new()
            }
        }
    }

    fn save_to_disk(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string(entries)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        let used: usize = entries.iter().map(|(k, v)| entry_size(k, v)).sum();
        check_quota(&entries, used, self.quota, key, value)?;

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save_to_disk(&entries) {
            // Keep memory in step with what is on disk
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            if let Err(e) = self.save_to_disk(&entries) {
                warn!(key = %key, "Failed to persist removal: {}", e);
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}
