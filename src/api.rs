//! Public API surface for the crescent visibility backend.
//!
//! This file consolidates the domain types shared by the engine, the
//! aggregator and the HTTP layer. All types derive Serialize/Deserialize
//! for JSON serialization.

pub use crate::ephemeris::Body;
pub use crate::ephemeris::Ephemeris;
pub use crate::ephemeris::EphemerisError;
pub use crate::ephemeris::RawGeometry;
pub use crate::ephemeris::SettingTime;
pub use crate::models::MoonAge;
pub use crate::models::ObservationInstant;
pub use crate::services::VisibilityError;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// Observing sites
// ============================================================================

/// Observing site (name, latitude, longitude, elevation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Site {
    /// Station name used in reports and logs
    pub name: String,
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude_deg: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude_deg: f64,
    /// Elevation in meters above sea level
    pub elevation_m: f64,
}

impl Site {
    pub fn new(
        name: impl Into<String>,
        latitude_deg: f64,
        longitude_deg: f64,
        elevation_m: f64,
    ) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        if !latitude_deg.is_finite() || !longitude_deg.is_finite() || !elevation_m.is_finite() {
            return Err("Coordinates must be finite numbers".to_string());
        }
        Ok(Self {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            elevation_m,
        })
    }
}

// ============================================================================
// Yallop q-test categories
// ============================================================================

/// Yallop visibility category, declared best-first.
///
/// The derived ordering follows declaration order, so `A < F` and sorting
/// a list of categories puts the most visible crescents first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum VisibilityClass {
    A,
    B,
    C,
    D,
    E,
    F,
}

/// Category thresholds as (exclusive lower bound, category) pairs.
///
/// A band is selected when q is strictly greater than its bound, so a q
/// landing exactly on a boundary falls into the band below it.
const Q_BANDS: [(f64, VisibilityClass); 5] = [
    (0.216, VisibilityClass::A),
    (-0.014, VisibilityClass::B),
    (-0.160, VisibilityClass::C),
    (-0.232, VisibilityClass::D),
    (-0.293, VisibilityClass::E),
];

impl VisibilityClass {
    /// Classify an unrounded q value.
    ///
    /// Callers must pass the q value straight out of the polynomial, not
    /// the 2 dp presentation value, otherwise observations within half a
    /// rounding step of a boundary land in the wrong band.
    pub fn from_q(q: f64) -> Self {
        for (lower, class) in Q_BANDS {
            if q > lower {
                return class;
            }
        }
        VisibilityClass::F
    }

    /// Human-readable description of the expected observation.
    pub fn description(&self) -> &'static str {
        match self {
            VisibilityClass::A => "Easily visible",
            VisibilityClass::B => "Visible under perfect conditions",
            VisibilityClass::C => "May need optical aid to find the crescent",
            VisibilityClass::D => "Will need optical aid to find the crescent",
            VisibilityClass::E => "Not visible with a telescope",
            VisibilityClass::F => "Not visible; below the Danjon limit",
        }
    }
}

impl std::fmt::Display for VisibilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisibilityClass::A => write!(f, "A"),
            VisibilityClass::B => write!(f, "B"),
            VisibilityClass::C => write!(f, "C"),
            VisibilityClass::D => write!(f, "D"),
            VisibilityClass::E => write!(f, "E"),
            VisibilityClass::F => write!(f, "F"),
        }
    }
}

// ============================================================================
// Engine output
// ============================================================================

/// Complete crescent visibility assessment for one site at sunset.
///
/// Instants are UTC. Angular fields are rounded to 4 dp, illumination to
/// 1 dp and q to 2 dp; [`category`] is classified from the unrounded q
/// before any rounding is applied.
///
/// [`category`]: VisibilityResult::category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityResult {
    /// Best-time instant: local sunset on the requested evening
    pub sunset: ObservationInstant,
    /// Moonset following sunset, or a polar sentinel
    pub moonset: SettingTime,
    /// Preceding new moon (geocentric conjunction)
    pub conjunction: ObservationInstant,
    /// Elapsed time since conjunction, truncated to hours and minutes
    pub moon_age: MoonAge,
    /// Topocentric moon altitude in degrees
    pub moon_altitude_deg: f64,
    /// Moon azimuth in degrees, north-based
    pub moon_azimuth_deg: f64,
    /// Sun altitude in degrees
    pub sun_altitude_deg: f64,
    /// Sun azimuth in degrees, north-based
    pub sun_azimuth_deg: f64,
    /// ARCV: moon altitude minus sun altitude, in degrees
    pub arcv_deg: f64,
    /// DAZ: sun azimuth minus moon azimuth, in degrees
    pub daz_deg: f64,
    /// ARCL: geocentric sun-moon elongation in degrees
    pub elongation_deg: f64,
    /// Provider-reported illuminated percentage of the disc
    pub moon_phase_pct: f64,
    /// Illuminated percentage from the elongation formula, 1 dp
    pub illumination_pct: f64,
    /// Topocentric crescent width, Yallop's W' term
    pub crescent_width: f64,
    /// Apparent angular diameter of the moon in arc minutes
    pub moon_angular_diameter_arcmin: f64,
    /// Earth-moon distance in astronomical units
    pub moon_distance_au: f64,
    /// Yallop test value
    pub q_value: f64,
    /// Yallop category classified from the unrounded q
    pub category: VisibilityClass,
}

// ============================================================================
// Multi-station aggregation
// ============================================================================

/// Per-station row of a network sweep.
///
/// Carries the full UTC engine output plus a display block: civil clock
/// faces shifted by the configured offset and headline angles rounded to
/// 2 dp for tabulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReport {
    pub station: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
    /// Full engine output in UTC at 4 dp precision
    pub geometry: VisibilityResult,
    /// Sunset on the display clock
    pub sunset_local: NaiveDateTime,
    /// Moonset on the display clock; `None` under a polar sentinel
    pub moonset_local: Option<NaiveDateTime>,
    /// Conjunction on the display clock
    pub conjunction_local: NaiveDateTime,
    /// Whole minutes between sunset and moonset; `None` under a polar sentinel
    pub lag_minutes: Option<i64>,
    pub moon_age: MoonAge,
    pub moon_altitude_deg: f64,
    pub moon_azimuth_deg: f64,
    pub sun_azimuth_deg: f64,
    pub arcv_deg: f64,
    pub daz_deg: f64,
    pub q_value: f64,
    pub category: VisibilityClass,
}

/// Why a station could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The sun never sets at this site on the requested evening
    SunAlwaysUp,
    /// The sun never rises at this site on the requested evening
    SunNeverRises,
    /// The ephemeris provider failed
    Ephemeris,
}

/// A station dropped from a sweep, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationFailure {
    pub station: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl StationFailure {
    pub fn new(station: impl Into<String>, error: &VisibilityError) -> Self {
        let kind = match error {
            VisibilityError::SunAlwaysUp { .. } => FailureKind::SunAlwaysUp,
            VisibilityError::SunNeverRises { .. } => FailureKind::SunNeverRises,
            VisibilityError::Ephemeris(_) => FailureKind::Ephemeris,
        };
        Self {
            station: station.into(),
            kind,
            reason: error.to_string(),
        }
    }
}

/// Summary of the station picked from a sweep: the lowest-elevation site
/// that produced a report, with its moon age and conjunction clock face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedObservation {
    pub station: String,
    pub moon_age: MoonAge,
    pub conjunction_date: NaiveDate,
    pub conjunction_time: NaiveTime,
}

/// Outcome of a network sweep: successful rows, dropped stations and the
/// selected summary. `selected` is `None` when every station failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub reports: Vec<StationReport>,
    pub failures: Vec<StationFailure>,
    pub selected: Option<SelectedObservation>,
}

#[cfg(test)]
mod tests {
    use super::{Site, VisibilityClass};
    use proptest::prelude::*;

    #[test]
    fn test_site_accepts_valid_coordinates() {
        let site = Site::new("Karachi", 24.8607, 67.0011, 10.0).unwrap();
        assert_eq!(site.name, "Karachi");
        assert_eq!(site.latitude_deg, 24.8607);
    }

    #[test]
    fn test_site_rejects_out_of_range_latitude() {
        assert!(Site::new("bad", 90.01, 0.0, 0.0).is_err());
        assert!(Site::new("bad", -90.01, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_site_rejects_out_of_range_longitude() {
        assert!(Site::new("bad", 0.0, 180.5, 0.0).is_err());
        assert!(Site::new("bad", 0.0, -181.0, 0.0).is_err());
    }

    #[test]
    fn test_site_rejects_non_finite_values() {
        assert!(Site::new("bad", f64::NAN, 0.0, 0.0).is_err());
        assert!(Site::new("bad", 0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_site_accepts_boundary_coordinates() {
        assert!(Site::new("north pole", 90.0, 0.0, 0.0).is_ok());
        assert!(Site::new("antimeridian", 0.0, -180.0, 0.0).is_ok());
    }

    #[test]
    fn test_category_band_interiors() {
        assert_eq!(VisibilityClass::from_q(1.5), VisibilityClass::A);
        assert_eq!(VisibilityClass::from_q(0.1), VisibilityClass::B);
        assert_eq!(VisibilityClass::from_q(-0.1), VisibilityClass::C);
        assert_eq!(VisibilityClass::from_q(-0.2), VisibilityClass::D);
        assert_eq!(VisibilityClass::from_q(-0.25), VisibilityClass::E);
        assert_eq!(VisibilityClass::from_q(-0.5), VisibilityClass::F);
    }

    #[test]
    fn test_category_boundaries_fall_into_lower_band() {
        // Exact boundary values belong to the band below.
        assert_eq!(VisibilityClass::from_q(0.216), VisibilityClass::B);
        assert_eq!(VisibilityClass::from_q(-0.014), VisibilityClass::C);
        assert_eq!(VisibilityClass::from_q(-0.160), VisibilityClass::D);
        assert_eq!(VisibilityClass::from_q(-0.232), VisibilityClass::E);
        assert_eq!(VisibilityClass::from_q(-0.293), VisibilityClass::F);
    }

    #[test]
    fn test_category_uses_unrounded_q() {
        // Both values present as 0.22 after 2 dp rounding, yet they sit on
        // opposite sides of the A/B boundary.
        assert_eq!(VisibilityClass::from_q(0.2164), VisibilityClass::A);
        assert_eq!(VisibilityClass::from_q(0.2155), VisibilityClass::B);
    }

    #[test]
    fn test_category_ordering_best_first() {
        assert!(VisibilityClass::A < VisibilityClass::B);
        assert!(VisibilityClass::E < VisibilityClass::F);
    }

    #[test]
    fn test_category_serializes_as_bare_letter() {
        let json = serde_json::to_string(&VisibilityClass::C).unwrap();
        assert_eq!(json, "\"C\"");
    }

    proptest! {
        #[test]
        fn prop_higher_q_never_grades_worse(a in -2.0..2.0f64, b in -2.0..2.0f64) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(VisibilityClass::from_q(hi) <= VisibilityClass::from_q(lo));
        }
    }
}
