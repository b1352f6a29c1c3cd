use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::PathBuf};

use crate::provider::openweather::DEFAULT_BASE_URL;

/// Environment variable carrying the OpenWeather API key.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";
pub const DATABASE_ENV: &str = "WEATHER_DASHBOARD_DB";
pub const LISTEN_ENV: &str = "WEATHER_DASHBOARD_LISTEN";
pub const DEFAULT_CITY_ENV: &str = "WEATHER_DASHBOARD_DEFAULT_CITY";

pub const DEFAULT_CITY: &str = "Tamilnadu";
pub const DEFAULT_DATABASE_PATH: &str = "weather.db";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

/// Dashboard settings, persisted as TOML in the platform config directory.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Chennai"
/// database_path = "weather.db"
/// listen_addr = "127.0.0.1:5000"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key. Without it every upstream lookup is rejected.
    pub api_key: Option<String>,

    /// City shown when the dashboard is first opened.
    pub default_city: String,

    /// SQLite file holding the favorites table.
    pub database_path: PathBuf,

    pub listen_addr: SocketAddr,

    pub openweather_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: DEFAULT_CITY.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            openweather_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Settings from the platform config file, or the defaults before `configure` has run.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Read the config at `path`. A missing file yields the defaults, since
    /// `configure` is what writes it.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Write the settings to the platform config file and return where they went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// `config.toml` under the platform's config directory for the dashboard.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; blank values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = var(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(path) = var(DATABASE_ENV) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(addr) = var(LISTEN_ENV) {
            self.listen_addr = addr
                .parse()
                .with_context(|| format!("{LISTEN_ENV} must be a socket address, got '{addr}'"))?;
        }
        if let Some(city) = var(DEFAULT_CITY_ENV) {
            self.default_city = city;
        }

        Ok(self)
    }

    /// Returns the API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }
}
