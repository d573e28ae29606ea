use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};

use super::loader::load_file;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Load cache keyed by (path, mtime, length)
// ---------------------------------------------------------------------------

/// Identity of a file on disk at load time. A changed modification time or
/// length means the cached table is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("reading metadata of {}", path.display()))?;
        Ok(FileStamp {
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            len: meta.len(),
        })
    }
}

/// Loaded datasets shared read-only with the rest of the app.
/// Entries never mutate after insertion; a stale entry is replaced wholesale.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, (FileStamp, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it on a miss or when
    /// the file changed since the last load.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let key = cache_key(path);
        let stamp = FileStamp::of(path)?;

        if let Some((cached_stamp, dataset)) = self.entries.get(&key) {
            if *cached_stamp == stamp {
                log::debug!("cache hit for {}", key.display());
                return Ok(Arc::clone(dataset));
            }
            log::info!("{} changed on disk, reloading", key.display());
        }

        let dataset = Arc::new(load_file(path)?);
        log::info!(
            "Loaded {} records with columns {:?}",
            dataset.len(),
            dataset.column_names()
        );
        self.entries.insert(key, (stamp, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(&cache_key(path)).is_some()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("outcomes.csv");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn repeated_loads_share_one_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "Gender,Job_Offers\nMale,1\nFemale,2\n");
        let mut cache = DatasetCache::new();

        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "Gender\nMale\n");
        let mut cache = DatasetCache::new();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 1);

        write_csv(dir.path(), "Gender\nMale\nFemale\nOther\n");
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 3);
    }

    #[test]
    fn invalidate_forces_a_fresh_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "Gender\nMale\n");
        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();

        assert!(cache.invalidate(&path));
        assert!(cache.is_empty());
        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new();
        assert!(cache.get_or_load(&dir.path().join("absent.csv")).is_err());
        assert!(cache.is_empty());
    }
}
