//! Access layer for the ShotGrid REST API (v1)
//!
//! This module provides a low-level interface to the ShotGrid site:
//! client-credentials authentication with a script name and API key, and the
//! entity `_search` endpoint.

pub mod auth;
pub mod entity;

use crate::client::ConnectionSettings;
use crate::error::{Result, ShotGridError};
use auth::AccessToken;
use reqwest::{Client, Proxy, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Path of the REST API below the site URL
const API_PATH: &str = "/api/v1";

/// Content type for search bodies using array-style filters
pub(crate) const ARRAY_FILTER_CONTENT_TYPE: &str = "application/vnd+shotgun.api3_array+json";

/// Largest page size accepted by the `_search` endpoint
pub const MAX_PAGE_SIZE: u32 = 500;

const USER_AGENT: &str = concat!("sgsequences/", env!("CARGO_PKG_VERSION"), " (sgquery)");

/// Error document returned by ShotGrid: `{"errors": [{...}]}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorResponse {
    fn message(&self) -> Option<String> {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| match (&e.title, &e.detail) {
                (Some(t), Some(d)) => format!("{}: {}", t, d),
                (Some(t), None) => t.clone(),
                (None, Some(d)) => d.clone(),
                (None, None) => "unknown error".to_string(),
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Low-level ShotGrid API client
pub struct ShotGridApi {
    /// HTTP client
    client: Client,
    /// Site URL without trailing slash
    site_url: String,
    script_name: String,
    api_key: String,
    /// Current bearer token, renewed when expired
    token: RwLock<Option<AccessToken>>,
    page_size: u32,
}

impl ShotGridApi {
    /// Creates the API client without contacting the site
    ///
    /// Without an explicit proxy the client connects directly, ignoring the
    /// system proxy settings.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT);

        builder = match settings.http_proxy.as_deref() {
            Some(proxy) => builder.proxy(Proxy::all(proxy).map_err(|e| {
                ShotGridError::Configuration(format!("invalid HTTP proxy {}: {}", proxy, e))
            })?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
            site_url: settings.site_url.trim_end_matches('/').to_string(),
            script_name: settings.script_name.clone(),
            api_key: settings.api_key.clone(),
            token: RwLock::new(None),
            page_size: MAX_PAGE_SIZE,
        })
    }

    /// Overrides the page size used when walking search results
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.site_url, API_PATH, endpoint)
    }

    /// POSTs a JSON body with the bearer token and parses the JSON answer
    pub(crate) async fn post_json<B, T>(
        &self,
        endpoint: &str,
        content_type: &str,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let token = self.bearer_token().await?;

        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// POSTs a form without authentication (token endpoint)
    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(endpoint);
        debug!("POST {} with {} params", url, params.len());

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handles the HTTP response
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let status_code = status.as_u16();

        debug!("Response status: {}", status);

        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|e| e.message())
                .unwrap_or(text);
            warn!("ShotGrid API error ({}): {}", status_code, message);
            return Err(ShotGridError::from_status_code(status_code, message));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            ShotGridError::JsonParse(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ConnectionSettings {
        ConnectionSettings::new("https://studio.shotgunstudio.com/", "script", "key")
    }

    #[test]
    fn test_api_creation() {
        let api = ShotGridApi::new(&settings()).unwrap();
        assert_eq!(api.site_url(), "https://studio.shotgunstudio.com");
        assert_eq!(api.script_name(), "script");
        assert_eq!(api.page_size(), MAX_PAGE_SIZE);
        assert_eq!(
            api.url("/entity/shots/_search"),
            "https://studio.shotgunstudio.com/api/v1/entity/shots/_search"
        );
    }

    #[test]
    fn test_page_size_is_clamped() {
        let mut api = ShotGridApi::new(&settings()).unwrap();
        api.set_page_size(0);
        assert_eq!(api.page_size(), 1);
        api.set_page_size(10_000);
        assert_eq!(api.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_proxy_is_a_configuration_error() {
        let settings = settings().with_proxy("http://[::1");
        assert!(matches!(
            ShotGridApi::new(&settings),
            Err(ShotGridError::Configuration(_))
        ));
    }

    #[test]
    fn test_error_response_message() {
        let body = r#"{"errors":[{"status":400,"title":"Bad filter","detail":"unknown field"}]}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message().as_deref(), Some("Bad filter: unknown field"));

        let empty: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.message(), None);
    }
}
