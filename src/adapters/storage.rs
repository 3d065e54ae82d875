use crate::core::StateStore;
use crate::utils::error::{Result, RvcError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

type Entries = BTreeMap<String, String>;

fn lock(entries: &Mutex<Entries>) -> Result<MutexGuard<'_, Entries>> {
    entries.lock().map_err(|_| RvcError::State {
        message: "state lock poisoned".to_string(),
    })
}

/// State persisted as a flat JSON object in a single file.
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStateStore {
    /// Opens the store, starting empty when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<Entries>(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable state file {}: {}", path.display(), e);
                Entries::new()
            }),
            Err(_) => Entries::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, data)?;
        tracing::debug!("State saved to {}", self.path.display());
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Non-persistent store, for tests and `--state-file` opt-outs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<Entries>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}
