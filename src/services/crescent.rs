//! Yallop q-test crescent visibility engine.
//!
//! Implements the empirical criterion from Yallop's fit of 295 recorded
//! crescent sightings (RGO NAO Technical Note 69, 1997). The chain runs
//! entirely on the raw geometry sampled at sunset:
//!
//! - ARCV, the altitude difference between moon and sun
//! - DAZ, the azimuth difference between sun and moon
//! - the topocentric crescent width W' from the semidiameter chain
//! - q, comparing ARCV against the width-dependent visibility limit
//!
//! Classification into the A-F bands uses the unrounded q; every rounded
//! field in the result is presentation only and never feeds back into a
//! formula.

use super::{round_dp, VisibilityError};
use crate::api::{Site, VisibilityClass, VisibilityResult};
use crate::ephemeris::{Body, Ephemeris, EARTH_RADIUS_KM, KM_PER_AU};
use crate::models::{MoonAge, ObservationInstant};

/// Illuminated percentage of the lunar disc for a given elongation.
pub fn illumination_pct(elongation_deg: f64) -> f64 {
    round_dp(50.0 * (1.0 - elongation_deg.to_radians().cos()), 1)
}

/// Topocentric crescent width, Yallop's W' term.
///
/// Runs the semidiameter chain: horizontal parallax from the Earth-moon
/// distance, geocentric semidiameter from the parallax, the altitude
/// correction to topocentric, then the width across the illuminated
/// limb.
pub fn crescent_width(moon_altitude_deg: f64, elongation_deg: f64, moon_distance_au: f64) -> f64 {
    let parallax = (EARTH_RADIUS_KM / (moon_distance_au * KM_PER_AU)).asin();
    let semidiameter = 0.27245 * parallax.sin();
    let topocentric =
        semidiameter * (1.0 + moon_altitude_deg.to_radians().sin() * parallax.sin());
    topocentric * (1.0 - elongation_deg.to_radians().cos())
}

/// Yallop's q value comparing ARCV against the visibility limit.
pub fn q_value(arcv_deg: f64, crescent_width: f64) -> f64 {
    let w = crescent_width * 60.0;
    let limit = 11.8371 - 6.3226 * w + 0.7319 * w.powi(2) - 0.1018 * w.powi(3);
    (arcv_deg - limit) / 10.0
}

/// Assess crescent visibility for `site` at the sunset instant.
///
/// Samples geometry once at sunset, searches the following moonset and
/// the preceding new moon, and derives the full q-test result. The
/// moonset stays a [`crate::ephemeris::SettingTime`] so polar states
/// survive into the output as values.
pub fn compute_visibility(
    provider: &dyn Ephemeris,
    site: &Site,
    sunset: ObservationInstant,
    horizon_dip_deg: f64,
) -> Result<VisibilityResult, VisibilityError> {
    let geometry = provider.sun_moon_geometry(site, sunset)?;
    let moonset = provider.next_setting(Body::Moon, site, sunset, horizon_dip_deg)?;
    let conjunction = provider.previous_new_moon(sunset)?;

    let arcv = geometry.moon_altitude_deg - geometry.sun_altitude_deg;
    let daz = geometry.sun_azimuth_deg - geometry.moon_azimuth_deg;
    let width = crescent_width(
        geometry.moon_altitude_deg,
        geometry.elongation_deg,
        geometry.moon_distance_au,
    );
    let q = q_value(arcv, width);

    log::debug!(
        "{}: sunset {sunset} arcv {arcv:.4} width {width:.6} q {q:.4}",
        site.name
    );

    Ok(VisibilityResult {
        sunset,
        moonset,
        conjunction,
        moon_age: MoonAge::between(conjunction, sunset),
        moon_altitude_deg: round_dp(geometry.moon_altitude_deg, 4),
        moon_azimuth_deg: round_dp(geometry.moon_azimuth_deg, 4),
        sun_altitude_deg: round_dp(geometry.sun_altitude_deg, 4),
        sun_azimuth_deg: round_dp(geometry.sun_azimuth_deg, 4),
        arcv_deg: round_dp(arcv, 4),
        daz_deg: round_dp(daz, 4),
        elongation_deg: round_dp(geometry.elongation_deg, 4),
        moon_phase_pct: round_dp(geometry.moon_phase_pct, 4),
        illumination_pct: illumination_pct(geometry.elongation_deg),
        crescent_width: round_dp(width, 4),
        moon_angular_diameter_arcmin: round_dp(geometry.moon_angular_diameter_arcmin, 4),
        moon_distance_au: round_dp(geometry.moon_distance_au, 4),
        q_value: round_dp(q, 2),
        category: VisibilityClass::from_q(q),
    })
}
