//! Scripted ephemeris provider for unit and integration tests.
//!
//! Replays canned samples instead of computing positions, so engine and
//! aggregator behavior can be pinned against exact inputs. Build one with
//! the `with_*` methods and hand it to anything that takes an
//! [`Ephemeris`].

use super::{Body, Ephemeris, EphemerisError, RawGeometry, SettingTime};
use crate::api::Site;
use crate::models::ObservationInstant;

/// Instants within this many seconds of a scripted sample match it.
const MATCH_TOLERANCE_SECONDS: i64 = 1;

/// Ephemeris implementation that replays scripted samples.
///
/// Lookups are keyed by site name (and instant, for geometry samples);
/// a query with no matching sample returns
/// [`EphemerisError::MissingSample`] instead of inventing data.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEphemeris {
    geometries: Vec<(String, ObservationInstant, RawGeometry)>,
    settings: Vec<(Body, String, SettingTime)>,
    new_moons: Vec<ObservationInstant>,
}

impl ScriptedEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the geometry returned for `site` at `at`.
    pub fn with_geometry(
        mut self,
        site: &str,
        at: ObservationInstant,
        geometry: RawGeometry,
    ) -> Self {
        self.geometries.push((site.to_string(), at, geometry));
        self
    }

    /// Script the setting outcome for `body` at `site`.
    pub fn with_setting(mut self, body: Body, site: &str, outcome: SettingTime) -> Self {
        self.settings.push((body, site.to_string(), outcome));
        self
    }

    /// Script a known conjunction instant.
    pub fn with_new_moon(mut self, at: ObservationInstant) -> Self {
        self.new_moons.push(at);
        self
    }
}

impl Ephemeris for ScriptedEphemeris {
    fn sun_moon_geometry(
        &self,
        site: &Site,
        at: ObservationInstant,
    ) -> Result<RawGeometry, EphemerisError> {
        self.geometries
            .iter()
            .find(|(name, scripted_at, _)| {
                *name == site.name
                    && (at.utc() - scripted_at.utc()).num_seconds().abs()
                        <= MATCH_TOLERANCE_SECONDS
            })
            .map(|(_, _, geometry)| *geometry)
            .ok_or_else(|| {
                EphemerisError::MissingSample(format!("geometry at {} for {at}", site.name))
            })
    }

    fn next_setting(
        &self,
        body: Body,
        site: &Site,
        _after: ObservationInstant,
        _horizon_dip_deg: f64,
    ) -> Result<SettingTime, EphemerisError> {
        self.settings
            .iter()
            .find(|(scripted_body, name, _)| *scripted_body == body && *name == site.name)
            .map(|(_, _, outcome)| *outcome)
            .ok_or_else(|| {
                EphemerisError::MissingSample(format!("{body} setting at {}", site.name))
            })
    }

    fn previous_new_moon(
        &self,
        before: ObservationInstant,
    ) -> Result<ObservationInstant, EphemerisError> {
        self.new_moons
            .iter()
            .filter(|t| **t <= before)
            .max()
            .copied()
            .ok_or_else(|| EphemerisError::MissingSample(format!("new moon before {before}")))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
