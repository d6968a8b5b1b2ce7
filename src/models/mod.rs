//! Core value types shared across the crate.

pub mod network;
pub mod time;

pub use network::{default_stations, stations_from_file, stations_from_toml};
pub use time::{MoonAge, ObservationInstant};
