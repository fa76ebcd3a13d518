//! Auto-refreshing, path-deduplicated file cache.
//!
//! This module provides:
//! - A registry that hands out one shared entry per canonical path
//! - Pull-based refresh: every read compares the file's modification time
//!   against the one recorded with the cached value
//! - Pluggable parse/serialize steps via [`FileFormat`]
//! - Atomic write-back for writable formats

mod atomic;
mod entry;
mod format;
mod registry;

pub use entry::{CachedFile, ReadOutcome};
pub use format::FileFormat;
pub use registry::FileCache;

/// A JSON object document, the shape of every `metaext.json`.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Cached handle to a JSON object document.
pub type MetaDocument = std::sync::Arc<CachedFile<JsonObject>>;
