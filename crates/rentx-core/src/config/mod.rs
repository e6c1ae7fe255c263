//! Client configuration shared by every front end.
//!
//! Stored as JSON; selected fields can be overridden from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const CONFIG_FILE_NAME: &str = "rentx-config.json";

pub const ENV_API_URL: &str = "RENTX_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "RENTX_ACCESS_TOKEN";
pub const ENV_DB_PATH: &str = "RENTX_DB_PATH";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_sync_on_start")]
    pub sync_on_start: bool,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Bearer token issued by the auth service; never logged
    #[serde(default)]
    pub access_token: Option<String>,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_probe_interval_secs() -> u64 {
    DEFAULT_PROBE_INTERVAL_SECS
}

const fn default_sync_on_start() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            probe_interval_secs: DEFAULT_PROBE_INTERVAL_SECS,
            sync_on_start: true,
            db_path: None,
            access_token: None,
        }
    }
}

impl ClientConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config = serde_json::from_str::<Self>(&raw)?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Apply `RENTX_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; blank values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = normalize_text_option(lookup(ENV_API_URL)) {
            self.api_base_url = Some(url);
        }
        if let Some(token) = normalize_text_option(lookup(ENV_ACCESS_TOKEN)) {
            self.access_token = Some(token);
        }
        if let Some(path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }
    }

    /// Validated API base URL without a trailing slash
    pub fn api_base_url(&self) -> Result<String> {
        let url = normalize_text_option(self.api_base_url.clone()).ok_or_else(|| {
            Error::InvalidInput(format!(
                "API base URL is not configured; set api_base_url or {ENV_API_URL}"
            ))
        })?;
        if !is_http_url(&url) {
            return Err(Error::InvalidInput(format!(
                "API base URL must include http:// or https://: {url}"
            )));
        }
        Ok(url.trim_end_matches('/').to_string())
    }

    pub fn access_token(&self) -> Option<String> {
        normalize_text_option(self.access_token.clone())
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub const fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string());
        self.access_token = normalize_text_option(self.access_token.clone());
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.probe_interval_secs == 0 {
            self.probe_interval_secs = DEFAULT_PROBE_INTERVAL_SECS;
        }
    }
}
