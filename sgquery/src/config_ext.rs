//! Extension adding ShotGrid settings to `sgconfig::Config`
//!
//! ```yaml
//! shotgrid:
//!   site_url: https://studio.shotgunstudio.com
//!   script_name: my_script
//!   api_key: "..."
//!   http_proxy: null
//!   timeout_secs: 30
//! query:
//!   project_id: 85
//!   fields: [sg_cut_duration, sg_ip_versions]
//! ```
//!
//! Every value can be overridden from the environment, e.g.
//! `SGSEQ_CONFIG__SHOTGRID__API_KEY=...`.

use crate::client::{ConnectionSettings, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::models::QueryFieldSet;
use anyhow::{Result, anyhow};
use serde_yaml::{Number, Value};
use sgconfig::Config;
use std::time::Duration;

/// Trait d'extension pour la configuration ShotGrid
///
/// # Example
///
/// ```rust,ignore
/// use sgconfig::Config;
/// use sgquery::ShotGridConfigExt;
///
/// let config = Config::load_config("")?;
/// let settings = config.get_shotgrid_settings()?;
/// println!("ShotGrid site: {}", settings.site_url);
/// ```
pub trait ShotGridConfigExt {
    /// ShotGrid site URL
    fn get_shotgrid_site_url(&self) -> Result<String>;

    fn set_shotgrid_site_url(&self, url: &str) -> Result<()>;

    /// Name of the API script used to authenticate
    fn get_shotgrid_script_name(&self) -> Result<String>;

    fn set_shotgrid_script_name(&self, name: &str) -> Result<()>;

    /// API key of the script
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or empty
    fn get_shotgrid_api_key(&self) -> Result<String>;

    fn set_shotgrid_api_key(&self, key: &str) -> Result<()>;

    /// HTTP proxy, `None` for a direct connection
    fn get_shotgrid_http_proxy(&self) -> Result<Option<String>>;

    /// Timeout applied to every ShotGrid request
    fn get_shotgrid_timeout(&self) -> Result<Duration>;

    /// All connection settings at once
    fn get_shotgrid_settings(&self) -> Result<ConnectionSettings>;

    /// Project aggregated when no project is given explicitly
    fn get_default_project_id(&self) -> Result<i64>;

    fn set_default_project_id(&self, project_id: i64) -> Result<()>;

    /// Query fields evaluated for sequences and shots
    fn get_query_fields(&self) -> Result<QueryFieldSet>;

    fn set_query_fields(&self, fields: &[&str]) -> Result<()>;
}

fn non_empty_string(config: &Config, path: &[&str]) -> Option<String> {
    match config.get_value(path) {
        Ok(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

impl ShotGridConfigExt for Config {
    fn get_shotgrid_site_url(&self) -> Result<String> {
        non_empty_string(self, &["shotgrid", "site_url"])
            .ok_or_else(|| anyhow!("ShotGrid site URL not configured"))
    }

    fn set_shotgrid_site_url(&self, url: &str) -> Result<()> {
        self.set_value(&["shotgrid", "site_url"], Value::String(url.to_string()))
    }

    fn get_shotgrid_script_name(&self) -> Result<String> {
        non_empty_string(self, &["shotgrid", "script_name"])
            .ok_or_else(|| anyhow!("ShotGrid script name not configured"))
    }

    fn set_shotgrid_script_name(&self, name: &str) -> Result<()> {
        self.set_value(&["shotgrid", "script_name"], Value::String(name.to_string()))
    }

    fn get_shotgrid_api_key(&self) -> Result<String> {
        non_empty_string(self, &["shotgrid", "api_key"])
            .ok_or_else(|| anyhow!("ShotGrid API key not configured"))
    }

    fn set_shotgrid_api_key(&self, key: &str) -> Result<()> {
        self.set_value(&["shotgrid", "api_key"], Value::String(key.to_string()))
    }

    fn get_shotgrid_http_proxy(&self) -> Result<Option<String>> {
        Ok(non_empty_string(self, &["shotgrid", "http_proxy"]))
    }

    fn get_shotgrid_timeout(&self) -> Result<Duration> {
        match self.get_value(&["shotgrid", "timeout_secs"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .map(Duration::from_secs)
                .ok_or_else(|| anyhow!("Invalid ShotGrid timeout: {}", n)),
            Ok(Value::Null) | Err(_) => Ok(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            Ok(other) => Err(anyhow!("Invalid ShotGrid timeout: {:?}", other)),
        }
    }

    fn get_shotgrid_settings(&self) -> Result<ConnectionSettings> {
        let mut settings = ConnectionSettings::new(
            self.get_shotgrid_site_url()?,
            self.get_shotgrid_script_name()?,
            self.get_shotgrid_api_key()?,
        )
        .with_timeout(self.get_shotgrid_timeout()?);
        settings.http_proxy = self.get_shotgrid_http_proxy()?;
        Ok(settings)
    }

    fn get_default_project_id(&self) -> Result<i64> {
        match self.get_value(&["query", "project_id"])? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| anyhow!("Invalid project id: {}", n)),
            Value::String(s) => s
                .parse()
                .map_err(|_| anyhow!("Invalid project id: {}", s)),
            other => Err(anyhow!("Invalid project id: {:?}", other)),
        }
    }

    fn set_default_project_id(&self, project_id: i64) -> Result<()> {
        self.set_value(&["query", "project_id"], Value::Number(Number::from(project_id)))
    }

    fn get_query_fields(&self) -> Result<QueryFieldSet> {
        match self.get_value(&["query", "fields"]) {
            Ok(Value::Sequence(items)) => {
                let names = items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) if !s.is_empty() => Ok(s),
                        other => Err(anyhow!("Invalid query field name: {:?}", other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(QueryFieldSet::new(names))
            }
            Ok(Value::Null) | Err(_) => Ok(QueryFieldSet::default()),
            Ok(other) => Err(anyhow!("query.fields must be a list, got {:?}", other)),
        }
    }

    fn set_query_fields(&self, fields: &[&str]) -> Result<()> {
        let items = fields
            .iter()
            .map(|f| Value::String(f.to_string()))
            .collect();
        self.set_value(&["query", "fields"], Value::Sequence(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let (_dir, config) = config();

        assert_eq!(
            config.get_shotgrid_site_url().unwrap(),
            "https://laika-demo.shotgunstudio.com"
        );
        assert_eq!(config.get_shotgrid_script_name().unwrap(), "code_challenge");
        assert_eq!(config.get_shotgrid_http_proxy().unwrap(), None);
        assert_eq!(config.get_shotgrid_timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(config.get_default_project_id().unwrap(), 85);
        assert_eq!(config.get_query_fields().unwrap(), QueryFieldSet::default());
    }

    #[test]
    fn test_api_key_is_required() {
        let (_dir, config) = config();
        config.set_shotgrid_api_key("").unwrap();

        assert!(config.get_shotgrid_api_key().is_err());
        assert!(config.get_shotgrid_settings().is_err());
    }

    #[test]
    fn test_settings_from_config() {
        let (_dir, config) = config();
        config.set_shotgrid_site_url("https://studio.test").unwrap();
        config.set_shotgrid_script_name("aggregator").unwrap();
        config.set_shotgrid_api_key("secret").unwrap();
        config
            .set_value(
                &["shotgrid", "http_proxy"],
                Value::String("http://proxy:3128".into()),
            )
            .unwrap();

        let settings = config.get_shotgrid_settings().unwrap();

        assert_eq!(
            settings,
            ConnectionSettings::new("https://studio.test", "aggregator", "secret")
                .with_proxy("http://proxy:3128")
        );
    }

    #[test]
    fn test_query_fields_round_trip() {
        let (_dir, config) = config();
        config.set_query_fields(&["sg_status_list", "description"]).unwrap();
        config.set_default_project_id(122).unwrap();

        assert_eq!(
            config.get_query_fields().unwrap().names(),
            vec!["sg_status_list", "description"]
        );
        assert_eq!(config.get_default_project_id().unwrap(), 122);
    }

    #[test]
    fn test_invalid_query_fields() {
        let (_dir, config) = config();
        config
            .set_value(&["query", "fields"], Value::String("sg_cut_duration".into()))
            .unwrap();

        assert!(config.get_query_fields().is_err());
    }
}
