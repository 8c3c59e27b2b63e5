//! Runtime configuration handed to `init()` by the Web Worker as JSON.
//!
//! Every field has a default, so `{}` (or an empty string) yields a working
//! offline configuration backed by the in-memory collaborators.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

use crate::error::{Error, Result};

/// Whether the upgrade cost survives a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeCostPolicy {
    /// Written to the `upgrade_cost` column alongside balance and multiplier.
    #[default]
    Persisted,
    /// Held in memory only; every load starts again from the base cost.
    SessionOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the hosted project (auth at `/auth/v1`, tables at `/rest/v1`).
    /// `None` runs fully offline.
    pub project_url: Option<String>,
    /// Public (anon) API key sent as the `apikey` header.
    pub anon_key: String,
    /// Table holding one row per player.
    pub table: String,
    /// OAuth provider used by "Continue with Google".
    pub oauth_provider: String,
    /// Where the provider sends the browser after OAuth sign-in.
    pub redirect_to: Option<String>,
    pub upgrade_cost_policy: UpgradeCostPolicy,
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: String,
    /// Delay before leaving the username view after a successful save.
    pub redirect_delay_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_url: None,
            anon_key: String::new(),
            table: "players".to_string(),
            oauth_provider: "google".to_string(),
            redirect_to: None,
            upgrade_cost_policy: UpgradeCostPolicy::default(),
            log_level: "info".to_string(),
            redirect_delay_ms: 2000,
        }
    }
}

impl Config {
    /// Parse and validate a JSON config. Blank input yields the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config = if json.trim().is_empty() {
            Config::default()
        } else {
            serde_json::from_str(json)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = self.project_url()? {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "project_url must be http or https, got {}",
                    url.scheme()
                )));
            }
            if self.anon_key.trim().is_empty() {
                return Err(Error::Config(
                    "anon_key is required when project_url is set".to_string(),
                ));
            }
        }
        if self.table.trim().is_empty() {
            return Err(Error::Config("table must not be empty".to_string()));
        }
        if self.oauth_provider.trim().is_empty() {
            return Err(Error::Config("oauth_provider must not be empty".to_string()));
        }
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| Error::Config(format!("unknown log_level {:?}", self.log_level)))?;
        Ok(())
    }

    /// Parsed project URL, if one is configured.
    pub fn project_url(&self) -> Result<Option<Url>> {
        match self.project_url.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(Url::parse(raw.trim())?)),
            _ => Ok(None),
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }
}
