//! Configuration management for erbeds.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "erbeds";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "ERBEDS_";

/// Largest page the public-data API will serve in one request.
const MAX_ROWS: u32 = 1000;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`ERBEDS_<SECTION>__<KEY>`)
/// 2. TOML config file at `~/.config/erbeds/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Public bed-availability API configuration.
    pub beds: BedsConfig,
    /// Geocoding provider configuration.
    pub geocode: GeocodeConfig,
    /// Map overlay configuration.
    pub map: MapConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the proxy listens on.
    pub bind_address: String,
}

/// Public-data bed availability API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedsConfig {
    /// Base URL of the `ErmctInfoInqireService` API.
    pub base_url: String,
    /// Service key issued by data.go.kr, used verbatim (keys are issued
    /// already percent-encoded).
    pub service_key: Option<String>,
    /// Rows requested when the caller does not specify `numOfRows`.
    pub default_rows: u32,
    /// Rows fetched when looking up a single hospital by id.
    pub detail_rows: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Geocoding (Kakao Local) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    /// Base URL of the Kakao API.
    pub base_url: String,
    /// Kakao REST API key.
    pub rest_key: Option<String>,
    /// Category group restricting keyword search results (HP8 = hospitals).
    pub category_group_code: String,
    /// Fixed delay between consecutive lookups in milliseconds.
    pub delay_ms: u64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Map overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Latitude of the initial map center.
    pub center_lat: f64,
    /// Longitude of the initial map center.
    pub center_lon: f64,
    /// Initial zoom level (Kakao levels, 1 is closest).
    pub level: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Default for BedsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apis.data.go.kr/B552657/ErmctInfoInqireService".to_string(),
            service_key: None,
            default_rows: 50,
            detail_rows: 100,
            timeout_secs: 10,
        }
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dapi.kakao.com".to_string(),
            rest_key: None,
            category_group_code: "HP8".to_string(),
            delay_ms: 300,
            timeout_secs: 10,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        // Seoul City Hall
        Self {
            center_lat: 37.5665,
            center_lon: 126.978,
            level: 8,
        }
    }
}

impl Config {
    /// Load configuration, reading `config_path` or the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// Build the layered figment for a config file path.
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// Credentials are not required here; they are checked when a client
    /// is built, so that `config show` works on a fresh install.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(invalid(format!(
                "bind_address is not a socket address: {}",
                self.server.bind_address
            )));
        }

        for (name, url) in [
            ("beds.base_url", &self.beds.base_url),
            ("geocode.base_url", &self.geocode.base_url),
        ] {
            if Url::parse(url).is_err() {
                return Err(invalid(format!("{name} is not a valid URL: {url}")));
            }
        }

        for (name, rows) in [
            ("default_rows", self.beds.default_rows),
            ("detail_rows", self.beds.detail_rows),
        ] {
            if rows == 0 || rows > MAX_ROWS {
                return Err(invalid(format!(
                    "{name} must be between 1 and {MAX_ROWS}, got {rows}"
                )));
            }
        }

        if self.beds.default_rows > self.beds.detail_rows {
            return Err(invalid(format!(
                "default_rows ({}) cannot be greater than detail_rows ({})",
                self.beds.default_rows, self.beds.detail_rows
            )));
        }

        if self.beds.timeout_secs == 0 || self.geocode.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be greater than 0"));
        }

        if self.geocode.category_group_code.trim().is_empty() {
            return Err(invalid("category_group_code must not be empty"));
        }

        if !(1..=14).contains(&self.map.level) {
            return Err(invalid(format!(
                "map level must be between 1 and 14, got {}",
                self.map.level
            )));
        }

        if !(-90.0..=90.0).contains(&self.map.center_lat)
            || !(-180.0..=180.0).contains(&self.map.center_lon)
        {
            return Err(invalid("map center is outside WGS84 range"));
        }

        Ok(())
    }

    /// Get the server bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address does not parse.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .map_err(|_| invalid(format!("bad bind_address: {}", self.server.bind_address)))
    }

    /// Get the bed API request timeout as a Duration.
    #[must_use]
    pub fn beds_timeout(&self) -> Duration {
        Duration::from_secs(self.beds.timeout_secs)
    }

    /// Get the geocoding request timeout as a Duration.
    #[must_use]
    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode.timeout_secs)
    }

    /// Get the delay between geocoding lookups as a Duration.
    #[must_use]
    pub fn geocode_delay(&self) -> Duration {
        Duration::from_millis(self.geocode.delay_ms)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
