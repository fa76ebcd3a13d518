//! Extension metadata stored next to host application data.
//!
//! Every level keeps its settings in a `metaext.json` file:
//! - items: in the item's `.info` directory
//! - libraries: at the library root, with per-folder and per-tag sections
//! - the application: in the host's user-data directory, split into scopes
//! - plugins: in the plugin directory
//!
//! All documents are read and written through the shared [`FileCache`], so
//! every accessor for the same file sees the same state.
//!
//! [`FileCache`]: crate::file_cache::FileCache

mod app;
pub mod item;
mod library;

pub use app::{default_user_data_dir, plugin_config, AppConfig};
pub use library::{FolderConfig, LibraryConfig, LibraryConfigData};

use crate::{MetaExtError, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::debug;

/// Create `path` with `initial` content unless it already exists.
pub(crate) fn ensure_file(path: &Path, initial: &str) -> Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(initial.as_bytes())
                .map_err(|e| MetaExtError::io_with_path(e, path))?;
            debug!("Created {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(MetaExtError::io_with_path(e, path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_file_creates_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metaext.json");

        ensure_file(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        fs::write(&path, r#"{"kept": true}"#).unwrap();
        ensure_file(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"kept": true}"#);
    }

    #[test]
    fn test_ensure_file_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope").join("metaext.json");

        let err = ensure_file(&path, "{}").unwrap_err();
        assert_eq!(err.path(), Some(path.as_path()));
    }
}
