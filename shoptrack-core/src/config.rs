//! Configuration management
//!
//! Settings live in `<data dir>/settings.json`:
//! ```json
//! {
//!   "apiBaseUrl": "https://shoptrack-backend.onrender.com/api",
//!   "requestTimeoutSecs": 30,
//!   "lowStockThreshold": 10
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::services::DEFAULT_LOW_STOCK_THRESHOLD;

pub const DEFAULT_API_BASE_URL: &str = "https://shoptrack-backend.onrender.com/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment override for the API base URL
pub const API_URL_ENV: &str = "SHOPTRACK_API_URL";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    low_stock_threshold: Option<i64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// ShopTrack client configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub low_stock_threshold: i64,
    api_base_url_from_env: bool,
    // Whole file as read, written back around our keys
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            api_base_url_from_env: false,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The API base URL can come from:
    /// 1. Environment variable SHOPTRACK_API_URL
    /// 2. Settings file (`shoptrack config set-url`)
    /// 3. The built-in default
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let env_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        let api_base_url_from_env = env_url.is_some();
        let api_base_url = env_url
            .or_else(|| raw.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            api_base_url,
            request_timeout_secs: raw
                .request_timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            low_stock_threshold: raw
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            api_base_url_from_env,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Write our keys back; keys written by other tools survive
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let settings_path = data_dir.join(SETTINGS_FILE);

        // Start from whatever is on disk
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        // Update only the fields we manage; an env override is never persisted
        settings.api_base_url = self._raw_settings.api_base_url.clone();
        settings.request_timeout_secs = Some(self.request_timeout_secs);
        settings.low_stock_threshold = Some(self.low_stock_threshold);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Point the client at a different backend
    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        let trimmed = url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).with_context(|| format!("Invalid URL: {}", url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("URL must use http or https: {}", url);
        }

        self.api_base_url = trimmed.to_string();
        self.api_base_url_from_env = false;
        self._raw_settings.api_base_url = Some(trimmed.to_string());
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when the base URL comes from the environment, not the settings file
    pub fn api_base_url_from_env(&self) -> bool {
        self.api_base_url_from_env
    }
}
