//! Centralized configuration for metaext.
//!
//! File names, host API endpoints and matching thresholds used across the crate.

use std::time::Duration;

/// Metadata file layout inside the host application's directories.
pub struct MetaConfig;

impl MetaConfig {
    /// Name of every extension config file (item, library, app, plugin).
    pub const METAEXT_FILE_NAME: &'static str = "metaext.json";
    /// Optional sidecar file next to an item's media file.
    pub const METAFILE_NAME: &'static str = "metafile";
    /// Library-level metadata maintained by the host application.
    pub const LIBRARY_METADATA_FILE_NAME: &'static str = "metadata.json";
    /// Directory suffix of a host library.
    pub const LIBRARY_SUFFIX: &'static str = ".library";
    /// Scope used in the application config when none is given.
    pub const SELF_IDENTIFY_ID: &'static str = "universal";
    /// Host application directory name under the platform config dir.
    pub const HOST_APP_DIR_NAME: &'static str = "Eagle";
    /// Initial content of a per-item, app or plugin config file.
    pub const EMPTY_DOCUMENT: &'static str = "{}";
    /// Initial content of a library config file.
    pub const EMPTY_LIBRARY_DOCUMENT: &'static str =
        r#"{"folderConfigs":{},"tagConfigs":{},"config":{}}"#;
}

/// Host HTTP API configuration.
pub struct WebApiConfig;

impl WebApiConfig {
    pub const BASE_URL: &'static str = "http://localhost:41595/api";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = "metaext/0.3";
    /// Default page size for `item/list`.
    pub const ITEM_LIST_LIMIT: u32 = 200;
}

/// Library name matching.
pub struct MatchConfig;

impl MatchConfig {
    /// A candidate must score strictly above this to be switched to.
    pub const DEFAULT_THRESHOLD: f64 = 0.5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_library_document_is_valid_json() {
        let value: serde_json::Value =
            serde_json::from_str(MetaConfig::EMPTY_LIBRARY_DOCUMENT).unwrap();
        assert!(value["folderConfigs"].is_object());
        assert!(value["tagConfigs"].is_object());
        assert!(value["config"].is_object());
    }

    #[test]
    fn test_thresholds_are_reasonable() {
        assert!(MatchConfig::DEFAULT_THRESHOLD > 0.0 && MatchConfig::DEFAULT_THRESHOLD < 1.0);
        assert!(WebApiConfig::REQUEST_TIMEOUT > Duration::ZERO);
    }
}
