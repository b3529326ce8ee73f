//! Lazily-opened, cached ShotGrid connection

use crate::client::{ConnectionSettings, ShotGridClient};
use crate::config_ext::ShotGridConfigExt;
use crate::error::{Result, ShotGridError};
use sgconfig::Config;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Opens one [`ShotGridClient`] on first use and hands out the same handle
/// afterwards
///
/// The connector is an ordinary value: the entry point builds it and passes
/// it (or the client it yields) to whoever needs ShotGrid access.
pub struct ShotGridConnector {
    settings: ConnectionSettings,
    connection: OnceCell<Arc<ShotGridClient>>,
}

impl ShotGridConnector {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            connection: OnceCell::new(),
        }
    }

    /// Builds a connector from the `shotgrid` section of the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.get_shotgrid_settings()?))
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// True once a connection has been established
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Returns the connection, opening it on the first call
    ///
    /// Construction errors are returned as is and nothing is cached, so a
    /// later call tries again.
    pub async fn get_connection(&self) -> Result<Arc<ShotGridClient>> {
        self.connection
            .get_or_try_init(|| async {
                let client = ShotGridClient::connect(&self.settings).await?;
                info!(
                    "Connection found: {} (token valid until {})",
                    client.site_url(),
                    client.auth_info().expires_at
                );
                Ok::<_, ShotGridError>(Arc::new(client))
            })
            .await
            .cloned()
    }
}

/// Opens the connection of `connector` at startup
///
/// Any failure is reported as [`ShotGridError::ConnectionFailed`] carrying the
/// underlying cause; callers are expected to abort initialization on it.
pub async fn open_connection(connector: &ShotGridConnector) -> Result<Arc<ShotGridClient>> {
    connector.get_connection().await.map_err(|e| {
        error!("Connection to ShotGrid failed: {}", e);
        ShotGridError::ConnectionFailed(e.to_string())
    })
}

/// Builds the connector from `config` and opens its connection
///
/// Missing or invalid settings fail the same way as a rejected connection,
/// as [`ShotGridError::ConnectionFailed`].
pub async fn open_configured_connection(
    config: &Config,
) -> Result<(ShotGridConnector, Arc<ShotGridClient>)> {
    let connector = ShotGridConnector::from_config(config).map_err(|e| {
        error!("Invalid ShotGrid settings: {}", e);
        ShotGridError::ConnectionFailed(e.to_string())
    })?;
    let client = open_connection(&connector).await?;
    Ok((connector, client))
}
