//! Atomic text file replacement.
//!
//! Implements atomic writes using:
//! 1. Write to a sibling temp file with a unique PID+TID suffix
//! 2. fsync to ensure data reaches disk
//! 3. Atomic rename to the target path
//!
//! The parent directory is not created; writing into a missing directory fails.

use crate::{MetaExtError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing::debug;

/// Replace the contents of `path` with `contents`.
///
/// Failures are reported as [`MetaExtError::Write`]. The temp file is
/// removed if the rename fails.
pub(crate) fn atomic_write_text(path: &Path, contents: &str) -> Result<()> {
    let temp_path = temp_path_for(path);

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| write_error(path, format!("Failed to create temp file {}", temp_path.display()), e))?;

        file.write_all(contents.as_bytes())
            .map_err(|e| write_error(path, format!("Failed to write temp file {}", temp_path.display()), e))?;

        file.sync_all()
            .map_err(|e| write_error(path, format!("Failed to sync temp file {}", temp_path.display()), e))?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(
            path,
            format!("Failed to rename {} to {}", temp_path.display(), path.display()),
            e,
        ));
    }

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn write_error(path: &Path, message: String, source: std::io::Error) -> MetaExtError {
    MetaExtError::Write {
        path: path.to_path_buf(),
        message,
        source: Some(source),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.{}.{}.tmp", file_name, process::id(), thread_id()))
}

/// Get a unique thread identifier.
fn thread_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    thread::current().id().hash(&mut hasher);
    hasher.finish()
}
