use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{archive::DEFAULT_ARCHIVE_PREFIX, provider::openweather::DEFAULT_BASE_URL};

pub const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_BASE_URL: &str = "OPENWEATHER_BASE_URL";
pub const ENV_BUCKET: &str = "AWS_BUCKET_NAME";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ENDPOINT: &str = "AWS_ENDPOINT_URL";
pub const ENV_CITIES: &str = "DASHBOARD_CITIES";

pub const DEFAULT_REPORT_KEY: &str = "weather-dashboard.html";

/// Runtime configuration, built once at startup and passed by reference.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// bucket = "my-weather-dashboard"
/// cities = ["Rabat", "Ottawa", "Tokyo"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key. Empty means "not configured"; the provider will reject it.
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom S3-compatible endpoint (MinIO, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_cities")]
    pub cities: Vec<String>,

    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,

    #[serde(default = "default_report_key")]
    pub report_key: String,

    /// Local file the report is written to before upload.
    #[serde(default = "default_staging_path")]
    pub staging_path: PathBuf,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cities() -> Vec<String> {
    ["Rabat", "Ottawa", "Tokyo"].iter().map(|c| c.to_string()).collect()
}

fn default_archive_prefix() -> String {
    DEFAULT_ARCHIVE_PREFIX.to_string()
}

fn default_report_key() -> String {
    DEFAULT_REPORT_KEY.to_string()
}

fn default_staging_path() -> PathBuf {
    PathBuf::from("weather_dashboard.html")
}

const fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            base_url: default_base_url(),
            cities: default_cities(),
            archive_prefix: default_archive_prefix(),
            report_key: default_report_key(),
            staging_path: default_staging_path(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Config file (if any), then `.env`, then process environment.
    pub fn resolve() -> Result<Self> {
        let mut cfg = Self::load()?;
        dotenvy::dotenv().ok();
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment values. Blank values are ignored so an empty
    /// variable never wipes a configured one.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = get(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = get(ENV_BUCKET) {
            self.bucket = v;
        }
        if let Some(v) = get(ENV_REGION) {
            self.region = v;
        }
        if let Some(v) = get(ENV_ENDPOINT) {
            self.endpoint = Some(v);
        }
        if let Some(v) = get(ENV_CITIES) {
            let cities = parse_city_list(&v);
            if !cities.is_empty() {
                self.cities = cities;
            }
        }
    }
}

/// Split a comma-separated city list, dropping blanks.
pub fn parse_city_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
