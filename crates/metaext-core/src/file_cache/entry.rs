//! A single cached file and its refresh logic.

use super::atomic::atomic_write_text;
use super::format::FileFormat;
use crate::{MetaExtError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Result of a staleness-checked read.
#[derive(Debug)]
pub enum ReadOutcome<T> {
    /// The value matches the file as of this read.
    Current(Arc<T>),
    /// The file could not be checked or re-read; the last good value is served.
    Stale { value: Arc<T>, error: MetaExtError },
}

impl<T> ReadOutcome<T> {
    pub fn value(&self) -> &Arc<T> {
        match self {
            ReadOutcome::Current(value) | ReadOutcome::Stale { value, .. } => value,
        }
    }

    pub fn into_value(self) -> Arc<T> {
        match self {
            ReadOutcome::Current(value) | ReadOutcome::Stale { value, .. } => value,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, ReadOutcome::Stale { .. })
    }

    /// The filesystem error behind a stale read.
    pub fn error(&self) -> Option<&MetaExtError> {
        match self {
            ReadOutcome::Current(_) => None,
            ReadOutcome::Stale { error, .. } => Some(error),
        }
    }
}

#[derive(Debug)]
struct EntryState<T> {
    value: Arc<T>,
    /// Modification time of the file when `value` was parsed or written.
    modified: Option<SystemTime>,
}

/// A file whose parsed contents are kept in memory and refreshed on read.
///
/// Obtained from [`FileCache::acquire`](super::FileCache::acquire); all callers
/// asking for the same canonical path share one `CachedFile`. Reads and writes
/// on one instance are serialized.
///
/// Staleness is decided by comparing modification times with strict
/// greater-than. Two writes landing within one timestamp tick of the
/// filesystem are indistinguishable, and the second one is not picked up
/// until the time advances again.
#[derive(Debug)]
pub struct CachedFile<T> {
    path: PathBuf,
    format: FileFormat<T>,
    state: Mutex<EntryState<T>>,
}

impl<T> CachedFile<T> {
    /// Read and parse `path` for the first time.
    ///
    /// Unlike later reads, a filesystem failure here is an error: there is no
    /// previous value to fall back on.
    pub(crate) fn load(path: PathBuf, format: FileFormat<T>) -> Result<Self> {
        let modified = fs::metadata(&path)
            .map_err(|e| MetaExtError::read(e, &path))?
            .modified()
            .ok();
        let content = read_text(&path)?;
        let value = format
            .parse(&content)
            .map_err(|message| MetaExtError::parse(&path, message))?;

        debug!("Loaded {} as {}", path.display(), format.name());
        Ok(Self {
            path,
            format,
            state: Mutex::new(EntryState {
                value: Arc::new(value),
                modified,
            }),
        })
    }

    /// Canonical path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &FileFormat<T> {
        &self.format
    }

    /// Current value, refreshed from disk if the file changed.
    ///
    /// Filesystem failures during the staleness check are logged and the
    /// last good value is returned. A parse failure is returned as an error.
    pub fn read(&self) -> Result<Arc<T>> {
        self.read_outcome().map(ReadOutcome::into_value)
    }

    /// Like [`read`](Self::read), but reports whether the value may be stale.
    pub fn read_outcome(&self) -> Result<ReadOutcome<T>> {
        let mut state = self.lock();
        self.refresh_locked(&mut state)
    }

    /// Last good value, without touching the filesystem.
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.lock().value)
    }

    /// Modification time recorded with the current value.
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.lock().modified
    }

    /// Serialize `value`, write it to the file and make it the current value.
    ///
    /// On failure the in-memory state is left untouched.
    pub fn write(&self, value: T) -> Result<()> {
        let mut state = self.lock();
        self.write_locked(&mut state, value)
    }

    /// Refresh, apply `f` to a copy of the value, and write the result back.
    ///
    /// The whole sequence runs under the entry's lock. A stale refresh does
    /// not abort the update; the write recreates the file from the last good
    /// value.
    pub fn update<R, F>(&self, f: F) -> Result<R>
    where
        T: Clone,
        F: FnOnce(&mut T) -> R,
    {
        let mut state = self.lock();
        let outcome = self.refresh_locked(&mut state)?;
        if let Some(error) = outcome.error() {
            warn!("Updating {} from a stale value: {}", self.path.display(), error);
        }

        let mut value = T::clone(outcome.value());
        let result = f(&mut value);
        self.write_locked(&mut state, value)?;
        Ok(result)
    }

    fn lock(&self) -> MutexGuard<'_, EntryState<T>> {
        // State is only ever replaced wholesale, so a poisoned lock still
        // guards a consistent value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh_locked(&self, state: &mut EntryState<T>) -> Result<ReadOutcome<T>> {
        let on_disk = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => return Ok(self.stale(state, MetaExtError::read(e, &self.path))),
        };

        let changed = match state.modified {
            Some(seen) => on_disk > seen,
            None => true,
        };
        if !changed {
            return Ok(ReadOutcome::Current(Arc::clone(&state.value)));
        }

        let content = match read_text(&self.path) {
            Ok(content) => content,
            Err(e @ MetaExtError::Read { .. }) => return Ok(self.stale(state, e)),
            Err(e) => return Err(e),
        };
        let value = self
            .format
            .parse(&content)
            .map_err(|message| MetaExtError::parse(&self.path, message))?;

        state.value = Arc::new(value);
        state.modified = Some(on_disk);
        debug!("Refreshed {}", self.path.display());
        Ok(ReadOutcome::Current(Arc::clone(&state.value)))
    }

    fn stale(&self, state: &EntryState<T>, error: MetaExtError) -> ReadOutcome<T> {
        warn!("Serving cached {}: {}", self.path.display(), error);
        ReadOutcome::Stale {
            value: Arc::clone(&state.value),
            error,
        }
    }

    fn write_locked(&self, state: &mut EntryState<T>, value: T) -> Result<()> {
        let serialized = self
            .format
            .serialize(&value)
            .ok_or_else(|| MetaExtError::Write {
                path: self.path.clone(),
                message: format!("{} files are read-only", self.format.name()),
                source: None,
            })?
            .map_err(|message| MetaExtError::Write {
                path: self.path.clone(),
                message,
                source: None,
            })?;

        atomic_write_text(&self.path, &serialized)?;

        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| MetaExtError::Write {
                path: self.path.clone(),
                message: "written file could not be inspected".to_string(),
                source: Some(e),
            })?;

        state.value = Arc::new(value);
        state.modified = Some(match state.modified {
            Some(seen) if seen > modified => seen,
            _ => modified,
        });
        Ok(())
    }
}

/// Read a file as UTF-8. Invalid UTF-8 is a parse error, not a read error.
fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| MetaExtError::read(e, path))?;
    String::from_utf8(bytes).map_err(|e| MetaExtError::parse(path, e.to_string()))
}
