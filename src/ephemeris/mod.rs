//! Ephemeris providers for sun and moon positions.
//!
//! The visibility engine never computes celestial mechanics itself; it
//! consumes the [`Ephemeris`] trait, allowing different providers to be
//! swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Service Layer (sunset, crescent, stations)             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Ephemeris Trait - Abstract Interface                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │  practical: practical-astronomy-rust adapter  │
//!     │  scripted:  canned samples for tests          │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! The `practical` backend answers positional queries with the
//! practical-astronomy-rust algorithms and derives setting and conjunction
//! instants by scanning and bisecting. The `scripted` backend replays
//! canned samples so the engine and aggregator can be tested against exact
//! inputs.

#[cfg(feature = "pa-ephemeris")]
pub mod practical;
pub mod scripted;

#[cfg(feature = "pa-ephemeris")]
pub use practical::PracticalAstronomy;
pub use scripted::ScriptedEphemeris;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::Site;
use crate::models::ObservationInstant;

/// Kilometers per astronomical unit.
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Equatorial radius of the Earth in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6_378.1;

/// Body whose setting instant can be searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Sun => write!(f, "sun"),
            Body::Moon => write!(f, "moon"),
        }
    }
}

/// Outcome of a setting-time search.
///
/// Sites inside the polar circles can spend weeks with a body permanently
/// above or below the horizon; those states are values here, never
/// in-band strings or magic instants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "time", rename_all = "snake_case")]
pub enum SettingTime {
    /// The body crosses the setting horizon at this instant
    At(ObservationInstant),
    /// The body stays above the horizon for the whole search window
    AlwaysUp,
    /// The body stays below the horizon for the whole search window
    NeverRises,
}

impl SettingTime {
    /// The crossing instant, if there is one.
    pub fn instant(&self) -> Option<ObservationInstant> {
        match self {
            SettingTime::At(t) => Some(*t),
            SettingTime::AlwaysUp | SettingTime::NeverRises => None,
        }
    }
}

/// Raw sun and moon geometry sampled at one instant for one site.
///
/// Altitudes and azimuths are topocentric degrees; the moon altitude
/// includes the parallax correction. Elongation is the geocentric
/// sun-moon separation. Providers return full precision; rounding is the
/// engine's presentation concern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawGeometry {
    /// Topocentric moon altitude in degrees
    pub moon_altitude_deg: f64,
    /// Moon azimuth in degrees, north-based
    pub moon_azimuth_deg: f64,
    /// Sun altitude in degrees
    pub sun_altitude_deg: f64,
    /// Sun azimuth in degrees, north-based
    pub sun_azimuth_deg: f64,
    /// Geocentric sun-moon elongation in degrees
    pub elongation_deg: f64,
    /// Provider-reported illuminated percentage of the disc, 0 to 100
    pub moon_phase_pct: f64,
    /// Earth-moon distance in astronomical units
    pub moon_distance_au: f64,
    /// Apparent angular diameter of the moon in arc minutes
    pub moon_angular_diameter_arcmin: f64,
}

/// Errors surfaced by ephemeris providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EphemerisError {
    /// The instant falls outside the provider's usable range.
    #[error("instant out of range for ephemeris computation: {0}")]
    TimeOutOfRange(String),

    /// An iterative search failed to bracket or converge on an event.
    #[error("ephemeris search failed: {0}")]
    Search(String),

    /// The provider has no sample for the requested query (scripted
    /// backends only).
    #[error("no scripted sample for {0}")]
    MissingSample(String),
}

/// Positional astronomy provider for the visibility pipeline.
///
/// Implementations must be cheap to share across threads; the HTTP layer
/// holds one behind an `Arc` and calls it from blocking worker tasks.
pub trait Ephemeris: Send + Sync {
    /// Sample sun and moon geometry at `at` as seen from `site`.
    fn sun_moon_geometry(
        &self,
        site: &Site,
        at: ObservationInstant,
    ) -> Result<RawGeometry, EphemerisError>;

    /// First setting of `body` after `after` at `site`.
    ///
    /// `horizon_dip_deg` lowers the setting horizon below the astronomical
    /// one, on top of the provider's refraction and semidiameter model.
    fn next_setting(
        &self,
        body: Body,
        site: &Site,
        after: ObservationInstant,
        horizon_dip_deg: f64,
    ) -> Result<SettingTime, EphemerisError>;

    /// Most recent geocentric new moon at or before `before`.
    fn previous_new_moon(
        &self,
        before: ObservationInstant,
    ) -> Result<ObservationInstant, EphemerisError>;

    /// Short provider name for logs and health reporting.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::SettingTime;
    use crate::models::ObservationInstant;

    #[test]
    fn test_setting_time_instant_accessor() {
        let t = ObservationInstant::from_timestamp(1_000_000).unwrap();
        assert_eq!(SettingTime::At(t).instant(), Some(t));
        assert_eq!(SettingTime::AlwaysUp.instant(), None);
        assert_eq!(SettingTime::NeverRises.instant(), None);
    }

    #[test]
    fn test_setting_time_serializes_tagged() {
        let json = serde_json::to_value(SettingTime::AlwaysUp).unwrap();
        assert_eq!(json["status"], "always_up");

        let t = ObservationInstant::from_timestamp(0).unwrap();
        let json = serde_json::to_value(SettingTime::At(t)).unwrap();
        assert_eq!(json["status"], "at");
        assert!(json["time"].is_string());
    }
}
