//! Persisted fingerprints, one record per feature.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;

const RECORD_FILE: &str = "hash";

/// Storage for the last accepted fingerprint of each feature.
///
/// Records for different features are independent. There is no locking:
/// concurrent runs against the same store may race.
pub trait CacheStore {
    /// Returns `Ok(None)` if the feature has never been recorded.
    fn read(&self, feature: &str) -> Result<Option<Fingerprint>>;

    /// Replaces the feature's record, creating its storage location if needed.
    fn write(&self, feature: &str, fingerprint: &Fingerprint) -> Result<()>;

    /// Removes one record, or every record when `feature` is `None`.
    fn clear(&self, feature: Option<&str>) -> Result<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for &T {
    fn read(&self, feature: &str) -> Result<Option<Fingerprint>> {
        (**self).read(feature)
    }

    fn write(&self, feature: &str, fingerprint: &Fingerprint) -> Result<()> {
        (**self).write(feature, fingerprint)
    }

    fn clear(&self, feature: Option<&str>) -> Result<()> {
        (**self).clear(feature)
    }
}

/// File-backed store: `<cache_dir>/<feature>/hash` holds the raw fingerprint text.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the record file for a feature.
    pub fn record_path(&self, feature: &str) -> PathBuf {
        self.cache_dir.join(feature).join(RECORD_FILE)
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self, feature: &str) -> Result<Option<Fingerprint>> {
        match fs::read_to_string(self.record_path(feature)) {
            Ok(content) => {
                let digest = content.trim();
                if digest.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Fingerprint::new(digest)))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::cache(feature, format!("failed to read record: {}", e))),
        }
    }

    fn write(&self, feature: &str, fingerprint: &Fingerprint) -> Result<()> {
        let path = self.record_path(feature);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::cache(feature, format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&path, fingerprint.as_str())
            .map_err(|e| Error::cache(feature, format!("failed to write record: {}", e)))
    }

    fn clear(&self, feature: Option<&str>) -> Result<()> {
        let (target, label) = match feature {
            Some(name) => (self.cache_dir.join(name), name),
            None => (self.cache_dir.clone(), "*"),
        };
        match fs::remove_dir_all(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::cache(label, format!("failed to clear: {}", e))),
        }
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    records: Mutex<HashMap<String, Fingerprint>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, feature: &str) -> Result<MutexGuard<'_, HashMap<String, Fingerprint>>> {
        self.records
            .lock()
            .map_err(|e| Error::cache(feature, format!("cache lock poisoned: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, feature: &str) -> Result<Option<Fingerprint>> {
        Ok(self.lock(feature)?.get(feature).cloned())
    }

    fn write(&self, feature: &str, fingerprint: &Fingerprint) -> Result<()> {
        self.lock(feature)?.insert(feature.to_string(), fingerprint.clone());
        Ok(())
    }

    fn clear(&self, feature: Option<&str>) -> Result<()> {
        let mut records = self.lock(feature.unwrap_or("*"))?;
        match feature {
            Some(name) => {
                records.remove(name);
            }
            None => records.clear(),
        }
        Ok(())
    }
}
