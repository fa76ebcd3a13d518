//! Async client for the host application's local HTTP API.
//!
//! ```rust,ignore
//! let api = WebApiClient::new()?;
//! let libraries = api.library().history().await?;
//! ```

mod client;
mod endpoints;

pub use client::{QueryParams, WebApiClient};
pub use endpoints::{
    ApplicationApi, BookmarkRequest, FolderApi, FolderUpdate, ItemApi, ItemListQuery,
    ItemUpdate, LibraryApi, PathImport, UrlImport, UrlsImport,
};
