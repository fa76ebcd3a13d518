//! Typed wrappers for the host API endpoints, grouped by resource.
//!
//! Optional request fields left as `None` are omitted from the request.

use super::client::{QueryParams, WebApiClient};
use crate::config::WebApiConfig;
use crate::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Fields for `folder/update`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUpdate {
    pub folder_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_color: Option<String>,
}

/// Fields for `item/update`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemUpdate {
    #[serde(rename = "id")]
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star: Option<bool>,
}

/// Filters for `item/list`.
#[derive(Debug, Clone)]
pub struct ItemListQuery {
    pub limit: u32,
    pub offset: u32,
    pub order_by: Option<String>,
    pub keyword: Option<String>,
    pub ext: Option<String>,
    pub tags: Option<Vec<String>>,
    pub folders: Option<Vec<String>>,
}

impl Default for ItemListQuery {
    fn default() -> Self {
        Self {
            limit: WebApiConfig::ITEM_LIST_LIMIT,
            offset: 0,
            order_by: None,
            keyword: None,
            ext: None,
            tags: None,
            folders: None,
        }
    }
}

impl ItemListQuery {
    fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .push("limit", self.limit)
            .push("offset", self.offset)
            .push_opt("orderBy", self.order_by.as_deref())
            .push_opt("keyword", self.keyword.as_deref())
            .push_opt("ext", self.ext.as_deref())
            .push_list("tags", self.tags.as_deref())
            .push_list("folders", self.folders.as_deref())
    }
}

/// Fields for `item/addBookmark`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRequest {
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

/// Fields for `item/addFromUrl`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlImport {
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

/// Fields for `item/addFromPath`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathImport {
    pub path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

/// Fields for `item/addFromURLs`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlsImport {
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl WebApiClient {
    pub fn application(&self) -> ApplicationApi<'_> {
        ApplicationApi(self)
    }

    pub fn folder(&self) -> FolderApi<'_> {
        FolderApi(self)
    }

    pub fn library(&self) -> LibraryApi<'_> {
        LibraryApi(self)
    }

    pub fn item(&self) -> ItemApi<'_> {
        ItemApi(self)
    }
}

/// `application/*` endpoints.
pub struct ApplicationApi<'a>(&'a WebApiClient);

impl ApplicationApi<'_> {
    pub async fn info(&self) -> Result<Value> {
        self.0.get("application/info", QueryParams::new()).await
    }
}

/// `folder/*` endpoints.
pub struct FolderApi<'a>(&'a WebApiClient);

impl FolderApi<'_> {
    pub async fn create(&self, name: &str, parent_id: Option<&str>) -> Result<Value> {
        let mut body = json!({ "folderName": name });
        if let Some(parent_id) = parent_id {
            body["parent"] = json!(parent_id);
        }
        self.0.post("folder/create", &body).await
    }

    pub async fn rename(&self, folder_id: &str, new_name: &str) -> Result<Value> {
        self.0
            .post("folder/rename", &json!({ "folderId": folder_id, "newName": new_name }))
            .await
    }

    pub async fn update(&self, update: &FolderUpdate) -> Result<Value> {
        self.0.post("folder/update", update).await
    }

    pub async fn list(&self) -> Result<Value> {
        self.0.get("folder/list", QueryParams::new()).await
    }

    pub async fn list_recent(&self) -> Result<Value> {
        self.0.get("folder/listRecent", QueryParams::new()).await
    }
}

/// `library/*` endpoints.
pub struct LibraryApi<'a>(&'a WebApiClient);

impl LibraryApi<'_> {
    pub async fn info(&self) -> Result<Value> {
        self.0.get("library/info", QueryParams::new()).await
    }

    /// Paths of recently opened libraries, most recent first.
    pub async fn history(&self) -> Result<Vec<String>> {
        self.0.get("library/history", QueryParams::new()).await
    }

    pub async fn switch(&self, library_path: &str) -> Result<Value> {
        self.0
            .post("library/switch", &json!({ "libraryPath": library_path }))
            .await
    }

    pub async fn icon(&self, library_path: &str) -> Result<Value> {
        self.0
            .get(
                "library/icon",
                QueryParams::new().push("libraryPath", library_path),
            )
            .await
    }
}

/// `item/*` endpoints.
pub struct ItemApi<'a>(&'a WebApiClient);

impl ItemApi<'_> {
    pub async fn update(&self, update: &ItemUpdate) -> Result<Value> {
        self.0.post("item/update", update).await
    }

    pub async fn refresh_thumbnail(&self, item_id: &str) -> Result<Value> {
        self.0
            .post("item/refreshThumbnail", &json!({ "id": item_id }))
            .await
    }

    pub async fn refresh_palette(&self, item_id: &str) -> Result<Value> {
        self.0
            .post("item/refreshPalette", &json!({ "id": item_id }))
            .await
    }

    pub async fn move_to_trash(&self, item_ids: &[String]) -> Result<Value> {
        self.0
            .post("item/moveToTrash", &json!({ "itemIds": item_ids }))
            .await
    }

    pub async fn list(&self, query: &ItemListQuery) -> Result<Value> {
        self.0.get("item/list", query.to_params()).await
    }

    pub async fn thumbnail(&self, item_id: &str) -> Result<Value> {
        self.0
            .get("item/thumbnail", QueryParams::new().push("id", item_id))
            .await
    }

    pub async fn info(&self, item_id: &str) -> Result<Value> {
        self.0
            .get("item/info", QueryParams::new().push("id", item_id))
            .await
    }

    pub async fn add_bookmark(&self, request: &BookmarkRequest) -> Result<Value> {
        self.0.post("item/addBookmark", request).await
    }

    pub async fn add_from_url(&self, request: &UrlImport) -> Result<Value> {
        self.0.post("item/addFromUrl", request).await
    }

    pub async fn add_from_path(&self, request: &PathImport) -> Result<Value> {
        self.0.post("item/addFromPath", request).await
    }

    pub async fn add_from_urls(&self, request: &UrlsImport) -> Result<Value> {
        self.0.post("item/addFromURLs", request).await
    }
}
