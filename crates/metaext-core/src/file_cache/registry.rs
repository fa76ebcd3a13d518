//! Registry of cached files keyed by canonical path.

use super::entry::CachedFile;
use super::format::FileFormat;
use crate::{MetaExtError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type AnyEntry = Arc<dyn Any + Send + Sync>;

/// Shared registry of [`CachedFile`]s.
///
/// Holds at most one entry per canonical path. Entries are never evicted;
/// they live as long as the registry. Create one per process (see
/// [`MetaExt`](crate::MetaExt)) and share it through `Arc`.
#[derive(Default)]
pub struct FileCache {
    entries: Mutex<HashMap<PathBuf, AnyEntry>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached file for `path`, loading it on first use.
    ///
    /// Paths that canonicalize to the same file return the same `Arc`. The
    /// `format` is only used when the entry is created. Asking for an already
    /// cached path with a different value type fails with
    /// [`MetaExtError::CacheTypeMismatch`].
    pub fn acquire<T>(&self, path: impl AsRef<Path>, format: FileFormat<T>) -> Result<Arc<CachedFile<T>>>
    where
        T: Send + Sync + 'static,
    {
        let path = path.as_ref();
        let canonical = path
            .canonicalize()
            .map_err(|e| MetaExtError::read(e, path))?;

        let mut entries = self.lock();
        if let Some(existing) = entries.get(&canonical) {
            return Arc::clone(existing)
                .downcast::<CachedFile<T>>()
                .map_err(|_| MetaExtError::CacheTypeMismatch { path: canonical });
        }

        let entry = Arc::new(CachedFile::load(canonical.clone(), format)?);
        entries.insert(canonical.clone(), Arc::clone(&entry) as AnyEntry);
        debug!("Cached {} ({} entries)", canonical.display(), entries.len());
        Ok(entry)
    }

    /// [`acquire`](Self::acquire) with the JSON format.
    pub fn acquire_json<T>(&self, path: impl AsRef<Path>) -> Result<Arc<CachedFile<T>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.acquire(path, FileFormat::json())
    }

    /// Whether `path` resolves to a file that is already cached.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        match path.as_ref().canonicalize() {
            Ok(canonical) => self.lock().contains_key(&canonical),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Canonical paths of all cached files, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, AnyEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCache").field("paths", &self.paths()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        name: String,
    }

    #[test]
    fn test_acquire_same_path_returns_same_entry() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        let path = temp_dir.path().join("a.json");
        fs::write(&path, r#"{"v": 1}"#).unwrap();

        let cache = FileCache::new();
        let first = cache.acquire_json::<Value>(&path).unwrap();
        let second = cache
            .acquire_json::<Value>(temp_dir.path().join("sub").join("..").join("a.json"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(*second.read().unwrap(), json!({"v": 1}));
    }

    #[test]
    fn test_acquire_missing_file_fails_and_registers_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new();

        let result = cache.acquire_json::<Value>(temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(MetaExtError::Read { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_acquire_parse_failure_registers_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();

        let cache = FileCache::new();
        assert!(matches!(
            cache.acquire_json::<Value>(&path),
            Err(MetaExtError::Parse { .. })
        ));
        assert!(!cache.contains(&path));

        // Fixing the file makes the next acquire succeed.
        fs::write(&path, "{}").unwrap();
        assert!(cache.acquire_json::<Value>(&path).is_ok());
        assert!(cache.contains(&path));
    }

    #[test]
    fn test_acquire_with_other_type_is_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{"name": "x"}"#).unwrap();

        let cache = FileCache::new();
        let typed = cache.acquire_json::<Settings>(&path).unwrap();
        assert_eq!(typed.read().unwrap().name, "x");

        let err = cache.acquire_json::<Value>(&path).unwrap_err();
        assert!(matches!(err, MetaExtError::CacheTypeMismatch { .. }));
    }

    #[test]
    fn test_paths_are_canonical_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["b.json", "a.json"] {
            fs::write(temp_dir.path().join(name), "{}").unwrap();
        }

        let cache = FileCache::new();
        cache.acquire_json::<Value>(temp_dir.path().join("b.json")).unwrap();
        cache.acquire_json::<Value>(temp_dir.path().join(".").join("a.json")).unwrap();

        let root = temp_dir.path().canonicalize().unwrap();
        assert_eq!(cache.paths(), vec![root.join("a.json"), root.join("b.json")]);
    }
}
