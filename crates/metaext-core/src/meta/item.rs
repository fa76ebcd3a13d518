//! Per-item paths and metadata.
//!
//! The host stores each item as `<library>/images/<id>.info/<file>`. All
//! functions take the path of the item's media file.

use super::ensure_file;
use crate::config::MetaConfig;
use crate::file_cache::{FileCache, MetaDocument};
use crate::{MetaExtError, Result};
use std::path::{Path, PathBuf};

/// Directory holding the item's files.
pub fn dirname(item_file: &Path) -> Result<&Path> {
    item_file
        .parent()
        .ok_or_else(|| MetaExtError::InvalidPath(item_file.to_path_buf()))
}

/// Path of the item's `metaext.json`, created as `{}` if missing.
pub fn metaext_path(item_file: &Path) -> Result<PathBuf> {
    let path = dirname(item_file)?.join(MetaConfig::METAEXT_FILE_NAME);
    ensure_file(&path, MetaConfig::EMPTY_DOCUMENT)?;
    Ok(path)
}

/// The item's extension metadata document.
pub fn metaext(cache: &FileCache, item_file: &Path) -> Result<MetaDocument> {
    cache.acquire_json(metaext_path(item_file)?)
}

/// Path of the item's `metafile` sidecar, if there is one.
pub fn metafile_path(item_file: &Path) -> Result<Option<PathBuf>> {
    let path = dirname(item_file)?.join(MetaConfig::METAFILE_NAME);
    Ok(path.exists().then_some(path))
}

/// Root directory of the library containing the item.
pub fn library_path(item_file: &Path) -> Result<PathBuf> {
    dirname(item_file)?
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| MetaExtError::InvalidPath(item_file.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn create_item(root: &Path) -> PathBuf {
        let info_dir = root
            .join("Art.library")
            .join("images")
            .join("K1ABC.info");
        fs::create_dir_all(&info_dir).unwrap();
        let item_file = info_dir.join("sunset.png");
        fs::write(&item_file, b"png").unwrap();
        item_file
    }

    #[test]
    fn test_item_paths() {
        let temp_dir = TempDir::new().unwrap();
        let item_file = create_item(temp_dir.path());

        assert!(dirname(&item_file).unwrap().ends_with("K1ABC.info"));
        assert_eq!(
            library_path(&item_file).unwrap(),
            temp_dir.path().join("Art.library")
        );
    }

    #[test]
    fn test_metaext_path_touches_file() {
        let temp_dir = TempDir::new().unwrap();
        let item_file = create_item(temp_dir.path());

        let path = metaext_path(&item_file).unwrap();
        assert!(path.ends_with("K1ABC.info/metaext.json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_metaext_document_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let item_file = create_item(temp_dir.path());
        let cache = FileCache::new();

        let doc = metaext(&cache, &item_file).unwrap();
        assert!(doc.read().unwrap().is_empty());

        doc.update(|obj| {
            obj.insert("rating".into(), json!(4));
        })
        .unwrap();

        let again = metaext(&cache, &item_file).unwrap();
        assert_eq!(again.read().unwrap()["rating"], json!(4));
    }

    #[test]
    fn test_metafile_path() {
        let temp_dir = TempDir::new().unwrap();
        let item_file = create_item(temp_dir.path());

        assert_eq!(metafile_path(&item_file).unwrap(), None);

        let sidecar = dirname(&item_file).unwrap().join("metafile");
        fs::write(&sidecar, "").unwrap();
        assert_eq!(metafile_path(&item_file).unwrap(), Some(sidecar));
    }

    #[test]
    fn test_library_path_too_shallow() {
        let err = library_path(Path::new("/item.png")).unwrap_err();
        assert!(matches!(err, MetaExtError::InvalidPath(_)));
    }
}
