//! Library-level configuration: global settings plus per-folder and per-tag
//! sections, stored in `<library>/metaext.json`.

use super::{ensure_file, item};
use crate::config::MetaConfig;
use crate::file_cache::{CachedFile, FileCache, JsonObject};
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Root structure of a library's `metaext.json`.
///
/// Folder and tag sections are keyed by id. Files that store them as a list
/// of `{"id": ...}` objects are accepted and normalized to the keyed form on
/// the next write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryConfigData {
    #[serde(default, deserialize_with = "keyed_by_id")]
    pub folder_configs: JsonObject,
    #[serde(default, deserialize_with = "keyed_by_id")]
    pub tag_configs: JsonObject,
    #[serde(default)]
    pub config: JsonObject,
    /// Unrecognized top-level fields, written back untouched.
    #[serde(flatten)]
    pub extra: JsonObject,
}

fn keyed_by_id<'de, D>(deserializer: D) -> std::result::Result<JsonObject, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Sections {
        Keyed(JsonObject),
        List(Vec<JsonObject>),
    }

    Ok(match Sections::deserialize(deserializer)? {
        Sections::Keyed(map) => map,
        Sections::List(list) => list
            .into_iter()
            .filter_map(|section| {
                let id = section.get("id")?.as_str()?.to_string();
                Some((id, Value::Object(section)))
            })
            .collect(),
    })
}

/// Handle to a library's extension configuration.
#[derive(Clone)]
pub struct LibraryConfig {
    library_path: PathBuf,
    file: Arc<CachedFile<LibraryConfigData>>,
}

impl LibraryConfig {
    /// Open the configuration of the library at `library_path`.
    ///
    /// Creates an empty configuration file if the library has none yet.
    pub fn open(cache: &FileCache, library_path: impl AsRef<Path>) -> Result<Self> {
        let library_path = library_path.as_ref().to_path_buf();
        let config_path = library_path.join(MetaConfig::METAEXT_FILE_NAME);
        ensure_file(&config_path, MetaConfig::EMPTY_LIBRARY_DOCUMENT)?;

        Ok(Self {
            file: cache.acquire_json(&config_path)?,
            library_path,
        })
    }

    /// Open the configuration of the library containing `item_file`.
    pub fn for_item(cache: &FileCache, item_file: &Path) -> Result<Self> {
        Self::open(cache, item::library_path(item_file)?)
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    /// Canonical path of the configuration file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The whole document.
    pub fn data(&self) -> Result<Arc<LibraryConfigData>> {
        self.file.read()
    }

    /// Replace the whole document.
    pub fn save(&self, data: LibraryConfigData) -> Result<()> {
        self.file.write(data)
    }

    /// Library-wide settings.
    pub fn config(&self) -> Result<JsonObject> {
        Ok(self.file.read()?.config.clone())
    }

    pub fn set_config_value(&self, key: &str, value: Value) -> Result<()> {
        self.file.update(|data| {
            data.config.insert(key.to_string(), value);
        })
    }

    /// Ids of folders that have a configuration section.
    pub fn folder_ids(&self) -> Result<Vec<String>> {
        Ok(self.file.read()?.folder_configs.keys().cloned().collect())
    }

    /// Configuration accessor for one folder. The folder need not have a
    /// section yet.
    pub fn folder_config(&self, folder_id: &str) -> FolderConfig {
        FolderConfig {
            file: Arc::clone(&self.file),
            folder_id: folder_id.to_string(),
        }
    }

    pub fn tag_config(&self, tag_id: &str) -> Result<Option<Value>> {
        Ok(self.file.read()?.tag_configs.get(tag_id).cloned())
    }

    pub fn set_tag_config(&self, tag_id: &str, value: Value) -> Result<()> {
        self.file.update(|data| {
            data.tag_configs.insert(tag_id.to_string(), value);
        })
    }
}

/// Configuration section of one folder inside a library's `metaext.json`.
#[derive(Clone)]
pub struct FolderConfig {
    file: Arc<CachedFile<LibraryConfigData>>,
    folder_id: String,
}

impl FolderConfig {
    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    /// The folder's section, if it has one.
    pub fn config(&self) -> Result<Option<JsonObject>> {
        let data = self.file.read()?;
        Ok(match data.folder_configs.get(&self.folder_id) {
            Some(Value::Object(section)) => Some(section.clone()),
            Some(other) => {
                warn!(
                    "Folder config {} in {} is not an object: {}",
                    self.folder_id,
                    self.file.path().display(),
                    other
                );
                None
            }
            None => None,
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.config()?.and_then(|mut section| section.remove(key)))
    }

    /// Set one key, creating the folder's section if needed.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let folder_id = self.folder_id.clone();
        self.file.update(move |data| {
            let section = data
                .folder_configs
                .entry(folder_id)
                .or_insert_with(|| Value::Object(JsonObject::new()));
            if !section.is_object() {
                *section = Value::Object(JsonObject::new());
            }
            if let Value::Object(section) = section {
                section.insert(key.to_string(), value);
            }
        })
    }

    /// Replace the folder's section.
    pub fn save(&self, config: JsonObject) -> Result<()> {
        let folder_id = self.folder_id.clone();
        self.file.update(move |data| {
            data.folder_configs.insert(folder_id, Value::Object(config));
        })
    }

    /// Remove the folder's section. Returns whether one existed.
    pub fn remove(&self) -> Result<bool> {
        let folder_id = self.folder_id.clone();
        self.file
            .update(move |data| data.folder_configs.remove(&folder_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn library_dir(temp_dir: &TempDir) -> PathBuf {
        let dir = temp_dir.path().join("Art.library");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_open_creates_default_document() {
        let temp_dir = TempDir::new().unwrap();
        let dir = library_dir(&temp_dir);
        let cache = FileCache::new();

        let config = LibraryConfig::open(&cache, &dir).unwrap();
        let raw: Value =
            serde_json::from_str(&fs::read_to_string(dir.join("metaext.json")).unwrap()).unwrap();
        assert_eq!(raw, json!({"folderConfigs": {}, "tagConfigs": {}, "config": {}}));
        assert_eq!(*config.data().unwrap(), LibraryConfigData::default());
        assert!(config.folder_ids().unwrap().is_empty());
    }

    #[test]
    fn test_folder_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = library_dir(&temp_dir);
        let cache = FileCache::new();

        let config = LibraryConfig::open(&cache, &dir).unwrap();
        let folder = config.folder_config("F1");
        assert_eq!(folder.config().unwrap(), None);

        folder.set("sortBy", json!("name")).unwrap();
        folder.set("pinned", json!(true)).unwrap();
        assert_eq!(folder.get("sortBy").unwrap(), Some(json!("name")));

        // A second accessor opened through the same cache sees the change.
        let reopened = LibraryConfig::open(&cache, &dir).unwrap();
        assert_eq!(reopened.folder_ids().unwrap(), vec!["F1".to_string()]);
        assert_eq!(
            reopened.folder_config("F1").config().unwrap(),
            json!({"sortBy": "name", "pinned": true}).as_object().cloned()
        );

        assert!(folder.remove().unwrap());
        assert!(!folder.remove().unwrap());
        assert!(reopened.folder_ids().unwrap().is_empty());
    }

    #[test]
    fn test_list_sections_are_normalized() {
        let temp_dir = TempDir::new().unwrap();
        let dir = library_dir(&temp_dir);
        fs::write(
            dir.join("metaext.json"),
            r#"{"folderConfigs":[{"id":"F1","color":"red"},{"noId":true}],"tagConfigs":[],"config":{"a":1},"version":2}"#,
        )
        .unwrap();

        let cache = FileCache::new();
        let config = LibraryConfig::open(&cache, &dir).unwrap();
        assert_eq!(config.folder_ids().unwrap(), vec!["F1".to_string()]);
        assert_eq!(config.folder_config("F1").get("color").unwrap(), Some(json!("red")));
        assert_eq!(config.config().unwrap()["a"], json!(1));

        config.set_tag_config("T1", json!({"hidden": true})).unwrap();
        let raw: Value =
            serde_json::from_str(&fs::read_to_string(dir.join("metaext.json")).unwrap()).unwrap();
        assert!(raw["folderConfigs"]["F1"].is_object());
        assert_eq!(raw["tagConfigs"]["T1"], json!({"hidden": true}));
        assert_eq!(raw["version"], json!(2));
    }

    #[test]
    fn test_config_values() {
        let temp_dir = TempDir::new().unwrap();
        let dir = library_dir(&temp_dir);
        let cache = FileCache::new();

        let config = LibraryConfig::open(&cache, &dir).unwrap();
        config.set_config_value("theme", json!("dark")).unwrap();
        assert_eq!(config.config().unwrap()["theme"], json!("dark"));
        assert_eq!(config.tag_config("missing").unwrap(), None);
    }

    #[test]
    fn test_for_item_resolves_library() {
        let temp_dir = TempDir::new().unwrap();
        let dir = library_dir(&temp_dir);
        let info_dir = dir.join("images").join("K1.info");
        fs::create_dir_all(&info_dir).unwrap();
        let item_file = info_dir.join("a.jpg");
        fs::write(&item_file, b"jpg").unwrap();

        let cache = FileCache::new();
        let config = LibraryConfig::for_item(&cache, &item_file).unwrap();
        assert_eq!(config.library_path(), dir.as_path());
        assert!(dir.join("metaext.json").exists());
    }
}
