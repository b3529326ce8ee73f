//! Authenticated ShotGrid client
//!
//! [`ShotGridClient`] wraps the low-level [`ShotGridApi`], authenticates on
//! construction and implements [`EntityService`] for the aggregation code.

use crate::api::ShotGridApi;
use crate::api::auth::AuthInfo;
use crate::error::{Result, ShotGridError};
use crate::models::{Entity, Filter};
use crate::service::EntityService;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything needed to open a ShotGrid connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    /// Site URL, e.g. `https://studio.shotgunstudio.com`
    pub site_url: String,
    /// Name of the API script
    pub script_name: String,
    /// API key of the script
    pub api_key: String,
    /// HTTP proxy; `None` connects directly
    pub http_proxy: Option<String>,
    pub timeout: Duration,
}

impl ConnectionSettings {
    pub fn new(
        site_url: impl Into<String>,
        script_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            script_name: script_name.into(),
            api_key: api_key.into(),
            http_proxy: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.http_proxy = Some(proxy.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks the settings before any network access
    pub fn validate(&self) -> Result<()> {
        if !(self.site_url.starts_with("http://") || self.site_url.starts_with("https://")) {
            return Err(ShotGridError::Configuration(format!(
                "site URL must be an http(s) URL, got '{}'",
                self.site_url
            )));
        }
        if self.script_name.is_empty() {
            return Err(ShotGridError::Configuration("script name is empty".into()));
        }
        if self.api_key.is_empty() {
            return Err(ShotGridError::Configuration("API key is empty".into()));
        }
        Ok(())
    }
}

/// ShotGrid client, authenticated on construction
pub struct ShotGridClient {
    api: ShotGridApi,
    auth_info: AuthInfo,
}

impl ShotGridClient {
    /// Creates the client and authenticates the script
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use sgquery::{ConnectionSettings, ShotGridClient};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let settings = ConnectionSettings::new(
    ///         "https://studio.shotgunstudio.com",
    ///         "my_script",
    ///         "my_api_key",
    ///     );
    ///     let client = ShotGridClient::connect(&settings).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        settings.validate()?;
        info!("Connecting to ShotGrid site {}", settings.site_url);

        let api = ShotGridApi::new(settings)?;
        let auth_info = api.authenticate().await?;

        Ok(Self { api, auth_info })
    }

    pub fn site_url(&self) -> &str {
        self.api.site_url()
    }

    /// Authentication obtained when connecting
    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }

    /// Low-level API access
    pub fn api(&self) -> &ShotGridApi {
        &self.api
    }
}

#[async_trait]
impl EntityService for ShotGridClient {
    async fn find(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[&str],
    ) -> Result<Vec<Entity>> {
        self.api.find(entity_type, filters, fields).await
    }

    async fn find_one(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[&str],
    ) -> Result<Option<Entity>> {
        self.api.find_one(entity_type, filters, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ConnectionSettings::new("https://x.test", "script", "key");
        assert_eq!(settings.http_proxy, None);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let bad_url = ConnectionSettings::new("ftp://x.test", "script", "key");
        assert!(matches!(bad_url.validate(), Err(ShotGridError::Configuration(_))));

        let no_key = ConnectionSettings::new("https://x.test", "script", "");
        assert!(matches!(no_key.validate(), Err(ShotGridError::Configuration(_))));

        let no_script = ConnectionSettings::new("https://x.test", "", "key");
        assert!(matches!(no_script.validate(), Err(ShotGridError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_settings_before_network() {
        let settings = ConnectionSettings::new("not-a-url", "script", "key");
        let err = ShotGridClient::connect(&settings).await.err().unwrap();
        assert!(matches!(err, ShotGridError::Configuration(_)));
    }
}
