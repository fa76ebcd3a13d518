//! Builder for configuring a [`MetaExt`] context.

use crate::file_cache::FileCache;
use crate::meta::default_user_data_dir;
use crate::webapi::WebApiClient;
use crate::{MetaExt, MetaExtError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Builder for [`MetaExt`].
///
/// # Example
///
/// ```rust,ignore
/// use metaext_core::MetaExt;
///
/// let ctx = MetaExt::builder()
///     .user_data_dir("/tmp/eagle")
///     .library_path("/Users/me/Art.library")
///     .auto_create_dirs(true)
///     .build()?;
/// ```
#[derive(Default)]
pub struct MetaExtBuilder {
    user_data_dir: Option<PathBuf>,
    library_path: Option<PathBuf>,
    api_base_url: Option<String>,
    api_token: Option<String>,
    auto_create_dirs: bool,
    cache: Option<Arc<FileCache>>,
}

impl MetaExtBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host user-data directory holding the application `metaext.json`.
    ///
    /// Default: the platform directory from [`default_user_data_dir`].
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Library to use instead of asking the host for the open one.
    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Host API endpoint. Default: `http://localhost:41595/api`.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Known API token; skips the `application/info` lookup.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Create the user-data directory if it doesn't exist.
    ///
    /// Default: `false` (the directory must exist)
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Share an existing cache instead of starting an empty one.
    pub fn with_cache(mut self, cache: Arc<FileCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<MetaExt> {
        let user_data_dir = match self.user_data_dir {
            Some(dir) => dir,
            None => default_user_data_dir().ok_or_else(|| MetaExtError::Config {
                message: "Could not determine the host user-data directory".to_string(),
            })?,
        };

        if !user_data_dir.exists() {
            if !self.auto_create_dirs {
                return Err(MetaExtError::Config {
                    message: format!(
                        "User-data directory does not exist: {}",
                        user_data_dir.display()
                    ),
                });
            }
            std::fs::create_dir_all(&user_data_dir).map_err(|e| MetaExtError::Io {
                message: format!(
                    "Failed to create user-data directory: {}",
                    user_data_dir.display()
                ),
                path: Some(user_data_dir.clone()),
                source: Some(e),
            })?;
            debug!("Created {}", user_data_dir.display());
        }

        let mut web_api = match self.api_base_url {
            Some(url) => WebApiClient::with_base_url(&url)?,
            None => WebApiClient::new()?,
        };
        if let Some(token) = self.api_token {
            web_api = web_api.with_token(token);
        }

        Ok(MetaExt {
            cache: self.cache.unwrap_or_default(),
            user_data_dir,
            library_path: self.library_path,
            web_api: Arc::new(web_api),
        })
    }
}
