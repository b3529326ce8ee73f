//! Script authentication for the ShotGrid REST API

use super::ShotGridApi;
use crate::error::{Result, ShotGridError};
use chrono::{DateTime, Duration, TimeDelta, Utc};
use serde::Deserialize;
use tracing::{debug, info};

/// Tokens are renewed this long before ShotGrid would reject them
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Answer of `/auth/access_token`
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Bearer token currently in use
#[derive(Debug, Clone)]
pub(crate) struct AccessToken {
    pub(crate) value: String,
    pub(crate) expires_at: DateTime<Utc>,
}

/// Expiration date of a token granted now for `expires_in` seconds
fn expiry_from(expires_in: i64) -> Result<DateTime<Utc>> {
    TimeDelta::try_seconds(expires_in)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| ShotGridError::Other(format!("invalid token lifetime: {}s", expires_in)))
}

impl AccessToken {
    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Result of a successful authentication
#[derive(Debug, Clone)]
pub struct AuthInfo {
    /// Script the token was granted to
    pub script_name: String,
    /// Token type, `Bearer` for script grants
    pub token_type: String,
    /// Expiration of the granted token
    pub expires_at: DateTime<Utc>,
}

impl ShotGridApi {
    /// Authenticates the script with its API key (client-credentials grant)
    ///
    /// # Errors
    ///
    /// * `ShotGridError::Unauthorized` - unknown script or wrong API key
    pub async fn authenticate(&self) -> Result<AuthInfo> {
        info!("Authenticating to {} as script {}", self.site_url, self.script_name);

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.script_name.as_str()),
            ("client_secret", self.api_key.as_str()),
        ];

        let response: TokenResponse = self
            .post_form("/auth/access_token", &params)
            .await
            .map_err(|e| match e {
                // ShotGrid answers 400 for rejected client credentials
                ShotGridError::ApiError { code: 400, message } => {
                    ShotGridError::Unauthorized(message)
                }
                other => other,
            })?;

        let expires_at = expiry_from(response.expires_in)?;
        debug!("Token granted, type {}, expires at {}", response.token_type, expires_at);

        *self.token.write().await = Some(AccessToken {
            value: response.access_token,
            expires_at,
        });

        Ok(AuthInfo {
            script_name: self.script_name.clone(),
            token_type: response.token_type,
            expires_at,
        })
    }

    /// Returns a valid bearer token, authenticating again when it expired
    pub(crate) async fn bearer_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if !token.is_expired() {
                return Ok(token.value.clone());
            }
        }

        debug!("Access token missing or expired");
        self.authenticate().await?;

        self.token
            .read()
            .await
            .as_ref()
            .map(|t| t.value.clone())
            .ok_or_else(|| ShotGridError::Other("no access token after authentication".into()))
    }

    /// True while a non-expired token is held
    pub async fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_expired())
    }

    /// Forgets the current token
    pub async fn logout(&self) {
        debug!("Dropping access token");
        *self.token.write().await = None;
    }
}
