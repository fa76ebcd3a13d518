//! HTTP client for the host application's local API.
//!
//! Every call carries the API token as a `token` query parameter. The token
//! is read once from `application/info` and reused.

use crate::config::WebApiConfig;
use crate::{MetaExtError, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// Helper to create a network error.
fn net_err(message: String) -> MetaExtError {
    MetaExtError::Network { message }
}

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Query string builder that skips unset values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Add a list as one comma-separated value.
    pub fn push_list(self, key: &str, values: Option<&[String]>) -> Self {
        match values {
            Some(values) => self.push(key, values.join(",")),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Client for the host application's HTTP API.
pub struct WebApiClient {
    base_url: Url,
    client: Client,
    token: RwLock<Option<String>>,
}

impl WebApiClient {
    /// Client for the default local endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(WebApiConfig::BASE_URL)
    }

    /// Client for a custom endpoint, e.g. a test server.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| MetaExtError::Config {
            message: format!("Invalid API base URL {}: {}", base_url, e),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(WebApiConfig::REQUEST_TIMEOUT)
            .user_agent(WebApiConfig::USER_AGENT)
            .build()
            .map_err(|e| net_err(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            token: RwLock::new(None),
        })
    }

    /// Use a known token instead of fetching one.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            ..self
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The API token, fetched from `application/info` on first use.
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut cached = self.token.write().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let url = self.build_url("application/info", None, &QueryParams::new())?;
        debug!("Fetching API token from {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| net_err(format!("Failed to connect to host API at {}: {}", url, e)))?;
        let info: Value = Self::decode("application/info", response).await?;

        let token = info
            .pointer("/preferences/developer/apiToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or(MetaExtError::MissingToken)?
            .to_string();

        info!("Obtained host API token");
        *cached = Some(token.clone());
        Ok(token)
    }

    /// `GET <base>/<path>?token=...&<params>`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: QueryParams) -> Result<T> {
        let token = self.token().await?;
        let url = self.build_url(path, Some(&token), &params)?;
        debug!("GET {}", path);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| net_err(format!("GET {} failed: {}", path, e)))?;
        Self::decode(path, response).await
    }

    /// `POST <base>/<path>?token=...` with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.token().await?;
        let url = self.build_url(path, Some(&token), &QueryParams::new())?;
        debug!("POST {}", path);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| net_err(format!("POST {} failed: {}", path, e)))?;
        Self::decode(path, response).await
    }

    pub(crate) fn build_url(
        &self,
        path: &str,
        token: Option<&str>,
        params: &QueryParams,
    ) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| MetaExtError::Config {
                message: format!("Invalid API path {}: {}", path, e),
            })?;

        if token.is_some() || !params.is_empty() {
            let mut query = url.query_pairs_mut();
            if let Some(token) = token {
                query.append_pair("token", token);
            }
            for (key, value) in params.pairs() {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetaExtError::Api {
                endpoint: endpoint.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| net_err(format!("Failed to parse {} response: {}", endpoint, e)))?;

        match envelope.status.as_deref() {
            None | Some("success") => {}
            Some(other) => {
                return Err(MetaExtError::Api {
                    endpoint: endpoint.to_string(),
                    message: envelope.message.unwrap_or_else(|| format!("status {}", other)),
                })
            }
        }

        serde_json::from_value(envelope.data.unwrap_or(Value::Null)).map_err(|e| MetaExtError::Api {
            endpoint: endpoint.to_string(),
            message: format!("Unexpected response data: {}", e),
        })
    }
}
