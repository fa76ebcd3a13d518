//! metaext core - extension metadata and host API access for a media
//! cataloging application.
//!
//! The crate provides:
//! - [`FileCache`]: a registry of parsed files that re-reads a file only when
//!   its modification time moves forward
//! - [`meta`]: `metaext.json` documents for items, libraries, folders, the
//!   application and plugins, all backed by the cache
//! - [`LibraryDirectory`]: typed access to a library's `metadata.json`
//! - [`WebApiClient`]: the host's local HTTP API
//! - [`matching`]: switching libraries by approximate name
//!
//! # Example
//!
//! ```rust,ignore
//! use metaext_core::MetaExt;
//!
//! #[tokio::main]
//! async fn main() -> metaext_core::Result<()> {
//!     let ctx = MetaExt::builder().build()?;
//!
//!     let app = ctx.app_config()?;
//!     app.set_scope_value(Some("my-plugin"), "enabled", true.into())?;
//!
//!     let folder = ctx.folder_config("KBJ8Z60O2D4LN").await?;
//!     println!("{:?}", folder.config()?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod file_cache;
pub mod library_dir;
pub mod matching;
pub mod meta;
pub mod webapi;

mod builder;

pub use builder::MetaExtBuilder;
pub use error::{MetaExtError, Result};
pub use file_cache::{CachedFile, FileCache, FileFormat, JsonObject, MetaDocument, ReadOutcome};
pub use library_dir::{Folder, LibraryDirectory, LibraryMetadata, TagsGroup};
pub use matching::{LibraryHistory, LibraryMatch};
pub use meta::{AppConfig, FolderConfig, LibraryConfig, LibraryConfigData};
pub use webapi::WebApiClient;

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared context: one file cache and one host API client.
///
/// Every accessor created from the same context sees the same cached
/// documents.
pub struct MetaExt {
    cache: Arc<FileCache>,
    user_data_dir: PathBuf,
    library_path: Option<PathBuf>,
    web_api: Arc<WebApiClient>,
}

impl MetaExt {
    pub fn builder() -> MetaExtBuilder {
        MetaExtBuilder::new()
    }

    /// Context for the platform user-data directory and the local host API.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn cache(&self) -> &Arc<FileCache> {
        &self.cache
    }

    pub fn web_api(&self) -> &Arc<WebApiClient> {
        &self.web_api
    }

    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    /// Application configuration in the user-data directory.
    pub fn app_config(&self) -> Result<AppConfig> {
        AppConfig::open(&self.cache, &self.user_data_dir)
    }

    /// A plugin's own `metaext.json`.
    pub fn plugin_config(&self, plugin_dir: impl AsRef<Path>) -> Result<MetaDocument> {
        meta::plugin_config(&self.cache, plugin_dir)
    }

    /// An item's `metaext.json`, next to its media file.
    pub fn item_metaext(&self, item_file: impl AsRef<Path>) -> Result<MetaDocument> {
        meta::item::metaext(&self.cache, item_file.as_ref())
    }

    /// Path of the library to work on.
    ///
    /// Uses the configured path if one was given, otherwise asks the host
    /// application for the library it has open.
    pub async fn current_library_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.library_path {
            return Ok(path.clone());
        }

        let info: Value = self.web_api.library().info().await?;
        let path = info
            .pointer("/library/path")
            .and_then(Value::as_str)
            .ok_or_else(|| MetaExtError::Api {
                endpoint: "library/info".to_string(),
                message: "response has no library path".to_string(),
            })?;
        debug!("Host library is {}", path);
        Ok(PathBuf::from(path))
    }

    /// Configuration of the current library.
    pub async fn library_config(&self) -> Result<LibraryConfig> {
        let library = self.current_library_path().await?;
        LibraryConfig::open(&self.cache, library)
    }

    /// Configuration of a specific library.
    pub fn library_config_at(&self, library_path: impl AsRef<Path>) -> Result<LibraryConfig> {
        LibraryConfig::open(&self.cache, library_path)
    }

    /// Configuration of one folder in the current library.
    pub async fn folder_config(&self, folder_id: &str) -> Result<FolderConfig> {
        Ok(self.library_config().await?.folder_config(folder_id))
    }

    /// The current library's directory.
    pub async fn library_directory(&self) -> Result<LibraryDirectory> {
        let library = self.current_library_path().await?;
        Ok(self.library_directory_at(library))
    }

    pub fn library_directory_at(&self, library_path: impl Into<PathBuf>) -> LibraryDirectory {
        LibraryDirectory::new(Arc::clone(&self.cache), library_path)
    }

    /// Switch the host to a library by name. See [`matching::switch_library`].
    pub async fn switch_library(
        &self,
        query: &str,
        exact: bool,
        threshold: f64,
    ) -> Result<Option<Value>> {
        matching::switch_library(self.web_api.as_ref(), query, exact, threshold).await
    }
}

impl std::fmt::Debug for MetaExt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaExt")
            .field("user_data_dir", &self.user_data_dir)
            .field("library_path", &self.library_path)
            .field("api", &self.web_api.base_url().as_str())
            .field("cached_files", &self.cache.len())
            .finish()
    }
}
