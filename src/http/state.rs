//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::api::Site;
use crate::config::Config;
use crate::ephemeris::Ephemeris;

/// Shared state handed to every handler.
///
/// Cloning is cheap: all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Ephemeris provider answering positional queries.
    pub ephemeris: Arc<dyn Ephemeris>,
    /// Service configuration loaded at startup.
    pub config: Arc<Config>,
    /// Station network used when a batch request supplies no sites.
    pub stations: Arc<Vec<Site>>,
}

impl AppState {
    pub fn new(ephemeris: Arc<dyn Ephemeris>, config: Config, stations: Vec<Site>) -> Self {
        Self {
            ephemeris,
            config: Arc::new(config),
            stations: Arc::new(stations),
        }
    }
}
