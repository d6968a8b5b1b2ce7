//! Service configuration loading.
//!
//! Configuration comes from an optional `hilal.toml`, with environment
//! variables taking precedence over the file and built-in defaults
//! backing both. Missing files are not an error; the defaults describe a
//! complete working service.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::Site;
use crate::models::network;

/// Locations probed for the config file, in order.
const DEFAULT_LOCATIONS: [&str; 2] = ["hilal.toml", "config/hilal.toml"];

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind host for the HTTP server
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port for the HTTP server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Hours added to UTC for batch display clock faces
    #[serde(default = "default_display_offset_hours")]
    pub display_offset_hours: f64,
    /// Extra horizon depression for setting searches, in degrees
    #[serde(default)]
    pub horizon_dip_deg: f64,
    /// Optional TOML file replacing the built-in station network
    #[serde(default)]
    pub stations_file: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_display_offset_hours() -> f64 {
    5.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            display_offset_hours: default_display_offset_hours(),
            horizon_dip_deg: 0.0,
            stations_file: None,
        }
    }
}

impl Config {
    /// Load from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load from the first default location that exists, falling back to
    /// defaults, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        for candidate in DEFAULT_LOCATIONS {
            let path = Path::new(candidate);
            if path.exists() {
                config = Self::from_file(path)?;
                break;
            }
        }
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from the environment.
    ///
    /// `HOST` and `PORT` control the bind address;
    /// `HILAL_DISPLAY_OFFSET_HOURS`, `HILAL_HORIZON_DIP_DEG` and
    /// `HILAL_STATIONS_FILE` control the domain settings.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }
        if let Ok(offset) = std::env::var("HILAL_DISPLAY_OFFSET_HOURS") {
            self.display_offset_hours = offset
                .parse()
                .with_context(|| format!("Invalid HILAL_DISPLAY_OFFSET_HOURS value: {offset}"))?;
        }
        if let Ok(dip) = std::env::var("HILAL_HORIZON_DIP_DEG") {
            self.horizon_dip_deg = dip
                .parse()
                .with_context(|| format!("Invalid HILAL_HORIZON_DIP_DEG value: {dip}"))?;
        }
        if let Ok(path) = std::env::var("HILAL_STATIONS_FILE") {
            self.stations_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Address string for the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The station network this deployment sweeps: the configured file
    /// if set, the built-in network otherwise.
    pub fn stations(&self) -> Result<Vec<Site>> {
        match &self.stations_file {
            Some(path) => network::stations_from_file(path),
            None => Ok(network::default_stations()),
        }
    }
}
