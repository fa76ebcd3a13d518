//! Read access to a library directory's own files, independent of the host
//! application process.
//!
//! Only `metadata.json` (folder tree and tag groups) is modelled.

use crate::config::MetaConfig;
use crate::file_cache::{CachedFile, FileCache, JsonObject};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// A folder in the library's folder tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub children: Vec<Folder>,
    #[serde(default)]
    pub modification_time: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_tips: String,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A named group of tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagsGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Root structure of a library's `metadata.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryMetadata {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub smart_folders: Vec<Value>,
    #[serde(default)]
    pub quick_access: Vec<Value>,
    #[serde(default)]
    pub tags_groups: Vec<TagsGroup>,
    #[serde(default)]
    pub modification_time: i64,
    #[serde(default)]
    pub application_version: String,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl LibraryMetadata {
    /// Find a folder anywhere in the tree, depth-first.
    pub fn folder_by_id(&self, id: &str) -> Option<&Folder> {
        find_folder(&self.folders, id)
    }

    pub fn tags_group_by_id(&self, id: &str) -> Option<&TagsGroup> {
        self.tags_groups.iter().find(|group| group.id == id)
    }

    pub fn tags_group_by_name(&self, name: &str) -> Option<&TagsGroup> {
        self.tags_groups.iter().find(|group| group.name == name)
    }
}

fn find_folder<'a>(folders: &'a [Folder], id: &str) -> Option<&'a Folder> {
    for folder in folders {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find_folder(&folder.children, id) {
            return Some(found);
        }
    }
    None
}

/// A library directory on disk.
///
/// `metadata.json` is acquired from the cache on first use and kept for the
/// lifetime of this value.
pub struct LibraryDirectory {
    directory: PathBuf,
    cache: Arc<FileCache>,
    metadata: OnceLock<Arc<CachedFile<LibraryMetadata>>>,
}

impl LibraryDirectory {
    pub fn new(cache: Arc<FileCache>, directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            cache,
            metadata: OnceLock::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Cached handle to `metadata.json`.
    pub fn metadata_file(&self) -> Result<Arc<CachedFile<LibraryMetadata>>> {
        if let Some(file) = self.metadata.get() {
            return Ok(Arc::clone(file));
        }
        let file = self
            .cache
            .acquire_json(self.directory.join(MetaConfig::LIBRARY_METADATA_FILE_NAME))?;
        Ok(Arc::clone(self.metadata.get_or_init(|| file)))
    }

    /// Current contents of `metadata.json`.
    pub fn metadata(&self) -> Result<Arc<LibraryMetadata>> {
        self.metadata_file()?.read()
    }

    pub fn folder_by_id(&self, id: &str) -> Result<Option<Folder>> {
        Ok(self.metadata()?.folder_by_id(id).cloned())
    }

    pub fn tags_group_by_id(&self, id: &str) -> Result<Option<TagsGroup>> {
        Ok(self.metadata()?.tags_group_by_id(id).cloned())
    }

    pub fn tags_group_by_name(&self, name: &str) -> Result<Option<TagsGroup>> {
        Ok(self.metadata()?.tags_group_by_name(name).cloned())
    }
}
