//! Built-in observing network and station file loading.
//!
//! The default network is the thirteen-station Pakistani sweep the
//! service was commissioned for. Deployments can swap in their own
//! network through a TOML stations file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::api::Site;

/// The built-in station network.
pub fn default_stations() -> Vec<Site> {
    [
        ("Karachi", 24.8607, 67.0011, 10.0),
        ("Lahore", 31.5497, 74.3436, 217.0),
        ("Islamabad", 33.6844, 73.0479, 666.0),
        ("Multan", 30.1575, 71.5249, 122.0),
        ("Peshawar", 34.0150, 71.5805, 359.0),
        ("Quetta", 30.1798, 66.9750, 1680.0),
        ("Mansehra", 34.3301, 73.1968, 1088.0),
        ("Dir District", 35.2071, 71.8765, 1120.0),
        ("Swabi", 34.1194, 72.4698, 340.0),
        ("Cherat", 33.8178, 71.9163, 1380.0),
        ("Jiwani", 25.0671, 61.8053, 0.0),
        ("Gilgit", 35.9208, 74.3085, 1500.0),
        ("Muzaffarabad", 34.3700, 73.4700, 737.0),
    ]
    .into_iter()
    .map(|(name, latitude_deg, longitude_deg, elevation_m)| Site {
        name: name.to_string(),
        latitude_deg,
        longitude_deg,
        elevation_m,
    })
    .collect()
}

#[derive(Debug, Deserialize)]
struct StationsFile {
    #[serde(default)]
    stations: Vec<StationEntry>,
}

#[derive(Debug, Deserialize)]
struct StationEntry {
    name: String,
    latitude_deg: f64,
    longitude_deg: f64,
    #[serde(default)]
    elevation_m: f64,
}

/// Load a station network from a TOML file.
///
/// # Example file
///
/// ```toml
/// [[stations]]
/// name = "Karachi"
/// latitude_deg = 24.8607
/// longitude_deg = 67.0011
/// elevation_m = 10.0
/// ```
pub fn stations_from_file(path: &Path) -> Result<Vec<Site>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stations file: {}", path.display()))?;
    stations_from_toml(&raw).with_context(|| format!("Invalid stations file: {}", path.display()))
}

/// Parse a station network from TOML text.
pub fn stations_from_toml(raw: &str) -> Result<Vec<Site>> {
    let parsed: StationsFile = toml::from_str(raw).context("Failed to parse stations TOML")?;
    if parsed.stations.is_empty() {
        bail!("stations file defines no stations");
    }
    parsed
        .stations
        .into_iter()
        .map(|entry| {
            Site::new(
                entry.name.clone(),
                entry.latitude_deg,
                entry.longitude_deg,
                entry.elevation_m,
            )
            .map_err(|reason| anyhow::anyhow!("station {}: {reason}", entry.name))
        })
        .collect()
}
