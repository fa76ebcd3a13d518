//! Application-wide and plugin configuration.

use super::ensure_file;
use crate::config::MetaConfig;
use crate::file_cache::{FileCache, JsonObject, MetaDocument};
use crate::{MetaExtError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Platform user-data directory of the host application.
///
/// - **Linux**: `~/.config/Eagle`
/// - **Windows**: `%APPDATA%\Eagle`
/// - **macOS**: `~/Library/Application Support/Eagle`
pub fn default_user_data_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(MetaConfig::HOST_APP_DIR_NAME))
}

/// Application configuration in `<userData>/metaext.json`.
///
/// The document is split into scopes, one top-level object per plugin.
/// Scope `"universal"` is used when none is given.
#[derive(Clone)]
pub struct AppConfig {
    file: MetaDocument,
}

impl AppConfig {
    /// Open the application configuration, creating `{}` if missing.
    pub fn open(cache: &FileCache, user_data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = user_data_dir.as_ref().join(MetaConfig::METAEXT_FILE_NAME);
        ensure_file(&path, MetaConfig::EMPTY_DOCUMENT)?;
        Ok(Self {
            file: cache.acquire_json(&path)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The whole document.
    pub fn config(&self) -> Result<std::sync::Arc<JsonObject>> {
        self.file.read()
    }

    /// Get a scope's settings, creating and persisting an empty scope if it
    /// does not exist yet.
    pub fn scope(&self, scope: Option<&str>) -> Result<JsonObject> {
        let scope = scope.unwrap_or(MetaConfig::SELF_IDENTIFY_ID);
        if let Some(existing) = self.file.read()?.get(scope) {
            return self.as_scope(scope, existing);
        }

        let created = self.file.update(|doc| {
            doc.entry(scope.to_string())
                .or_insert_with(|| Value::Object(JsonObject::new()))
                .clone()
        })?;
        self.as_scope(scope, &created)
    }

    /// Set one key inside a scope.
    pub fn set_scope_value(&self, scope: Option<&str>, key: &str, value: Value) -> Result<()> {
        let scope = scope.unwrap_or(MetaConfig::SELF_IDENTIFY_ID);
        if let Some(existing) = self.file.read()?.get(scope) {
            self.as_scope(scope, existing)?;
        }

        self.file.update(|doc| {
            if let Value::Object(section) = doc
                .entry(scope.to_string())
                .or_insert_with(|| Value::Object(JsonObject::new()))
            {
                section.insert(key.to_string(), value);
            }
        })
    }

    /// Replace a scope's settings.
    pub fn save_scope(&self, scope: Option<&str>, settings: JsonObject) -> Result<()> {
        let scope = scope.unwrap_or(MetaConfig::SELF_IDENTIFY_ID);
        self.file.update(|doc| {
            doc.insert(scope.to_string(), Value::Object(settings));
        })
    }

    fn as_scope(&self, scope: &str, value: &Value) -> Result<JsonObject> {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| not_an_object(self.file.path(), scope))
    }
}

fn not_an_object(path: &Path, scope: &str) -> MetaExtError {
    MetaExtError::Config {
        message: format!("scope {:?} in {} is not an object", scope, path.display()),
    }
}

/// A plugin's own `metaext.json`, created as `{}` if missing.
pub fn plugin_config(cache: &FileCache, plugin_dir: impl AsRef<Path>) -> Result<MetaDocument> {
    let path = plugin_dir.as_ref().join(MetaConfig::METAEXT_FILE_NAME);
    ensure_file(&path, MetaConfig::EMPTY_DOCUMENT)?;
    cache.acquire_json(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn read_raw(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_default_scope_is_created_and_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new();

        let app = AppConfig::open(&cache, temp_dir.path()).unwrap();
        assert!(app.scope(None).unwrap().is_empty());
        assert_eq!(read_raw(&temp_dir.path().join("metaext.json")), json!({"universal": {}}));
    }

    #[test]
    fn test_scope_values() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new();
        let app = AppConfig::open(&cache, temp_dir.path()).unwrap();

        app.set_scope_value(Some("tagger"), "model", json!("clip")).unwrap();
        app.set_scope_value(None, "lang", json!("en")).unwrap();

        assert_eq!(app.scope(Some("tagger")).unwrap()["model"], json!("clip"));
        assert_eq!(
            read_raw(app.path()),
            json!({"tagger": {"model": "clip"}, "universal": {"lang": "en"}})
        );

        let mut settings = JsonObject::new();
        settings.insert("model".into(), json!("blip"));
        app.save_scope(Some("tagger"), settings).unwrap();
        assert_eq!(app.scope(Some("tagger")).unwrap()["model"], json!("blip"));
    }

    #[test]
    fn test_non_object_scope_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("metaext.json"), r#"{"universal": 3}"#).unwrap();
        let cache = FileCache::new();
        let app = AppConfig::open(&cache, temp_dir.path()).unwrap();

        assert!(matches!(app.scope(None), Err(MetaExtError::Config { .. })));
        assert!(matches!(
            app.set_scope_value(None, "k", json!(1)),
            Err(MetaExtError::Config { .. })
        ));
    }

    #[test]
    fn test_plugin_config() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new();

        let doc = plugin_config(&cache, temp_dir.path()).unwrap();
        assert!(doc.read().unwrap().is_empty());
        assert!(Arc::ptr_eq(&doc, &plugin_config(&cache, temp_dir.path()).unwrap()));
    }
}
