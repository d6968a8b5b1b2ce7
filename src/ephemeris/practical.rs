//! Ephemeris backend built on the practical-astronomy-rust algorithms.
//!
//! The pa routines answer positional queries (equatorial coordinates,
//! distances, angular sizes) for a given UTC clock reading. Everything
//! else lives here: conversion to the horizontal frame through sidereal
//! time, the parallax-in-altitude correction for the moon, and the
//! scan-and-bisect searches for setting instants and the preceding new
//! moon.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use practical_astronomy_rust::{moon as pa_moon, sun as pa_sun};

use super::{Body, Ephemeris, EphemerisError, RawGeometry, SettingTime, KM_PER_AU};
use crate::api::Site;
use crate::models::ObservationInstant;

/// Mean obliquity of the ecliptic at J2000, in degrees.
const OBLIQUITY_DEG: f64 = 23.439_291_1;

/// Atmospheric refraction at the horizon, in arc minutes.
const HORIZON_REFRACTION_ARCMIN: f64 = 34.0;

/// Years this backend will answer queries for.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Coarse scan step for setting searches. The moon gains at most a few
/// degrees of altitude per step, so a horizon crossing cannot slip
/// between samples.
const SETTING_SCAN_STEP_MINUTES: i64 = 20;

/// Setting searches give up past this horizon; beyond it the site is in
/// a polar day or polar night state.
const SETTING_SCAN_WINDOW_HOURS: i64 = 72;

/// Coarse scan step for the conjunction search. The moon outruns the sun
/// by roughly half a degree per hour, so six-hour samples move the phase
/// angle by about three degrees.
const CONJUNCTION_SCAN_STEP_HOURS: i64 = 6;

/// One synodic month plus margin.
const CONJUNCTION_SCAN_WINDOW_DAYS: i64 = 35;

const BISECTION_TOLERANCE_SECONDS: i64 = 1;
const MAX_BISECTION_ITERATIONS: u32 = 64;

/// Ephemeris provider backed by practical-astronomy-rust.
///
/// Stateless; a single value can be shared behind an `Arc` and queried
/// from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PracticalAstronomy;

impl PracticalAstronomy {
    pub fn new() -> Self {
        Self
    }

    fn check_range(&self, at: ObservationInstant) -> Result<(), EphemerisError> {
        let year = at.utc().year();
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(EphemerisError::TimeOutOfRange(format!(
                "{at} is outside the supported years {MIN_YEAR}..={MAX_YEAR}"
            )));
        }
        Ok(())
    }

    /// Altitude of `body` above its setting horizon, in degrees.
    ///
    /// Positive while the body is still up. The setting horizon sits
    /// below the astronomical one by refraction, the body's semidiameter
    /// and the caller's horizon dip, so a zero crossing marks the moment
    /// the upper limb disappears.
    fn altitude_above_setting(
        &self,
        body: Body,
        site: &Site,
        t: DateTime<Utc>,
        target_alt_deg: f64,
    ) -> f64 {
        let alt = match body {
            Body::Sun => {
                let sun = sun_equatorial(t);
                horizontal(&sun, site, t).0
            }
            Body::Moon => {
                let moon = moon_equatorial(t);
                let (alt_geocentric, _az) = horizontal(&moon, site, t);
                let (_dist, _diam, hp_deg) = moon_distance_and_size(t);
                topocentric_altitude(alt_geocentric, hp_deg)
            }
        };
        alt - target_alt_deg
    }

    fn bisect_setting(
        &self,
        body: Body,
        site: &Site,
        mut above: DateTime<Utc>,
        mut below: DateTime<Utc>,
        target_alt_deg: f64,
    ) -> DateTime<Utc> {
        for _ in 0..MAX_BISECTION_ITERATIONS {
            if (below - above).num_seconds() <= BISECTION_TOLERANCE_SECONDS {
                break;
            }
            let mid = above + Duration::seconds((below - above).num_seconds() / 2);
            if self.altitude_above_setting(body, site, mid, target_alt_deg) > 0.0 {
                above = mid;
            } else {
                below = mid;
            }
        }
        below
    }

    /// Signed moon-minus-sun ecliptic longitude difference in degrees,
    /// normalized to (-180, 180]. Crosses zero upward at conjunction.
    fn phase_angle_deg(&self, t: DateTime<Utc>) -> f64 {
        let sun = sun_equatorial(t);
        let moon = moon_equatorial(t);
        normalize_to_pm180(ecliptic_longitude_deg(&moon) - ecliptic_longitude_deg(&sun))
    }

    fn bisect_conjunction(
        &self,
        mut earlier: DateTime<Utc>,
        mut later: DateTime<Utc>,
    ) -> DateTime<Utc> {
        for _ in 0..MAX_BISECTION_ITERATIONS {
            if (later - earlier).num_seconds() <= BISECTION_TOLERANCE_SECONDS {
                break;
            }
            let mid = earlier + Duration::seconds((later - earlier).num_seconds() / 2);
            if self.phase_angle_deg(mid) >= 0.0 {
                later = mid;
            } else {
                earlier = mid;
            }
        }
        later
    }
}

impl Ephemeris for PracticalAstronomy {
    fn sun_moon_geometry(
        &self,
        site: &Site,
        at: ObservationInstant,
    ) -> Result<RawGeometry, EphemerisError> {
        self.check_range(at)?;
        let t = at.utc();

        let sun = sun_equatorial(t);
        let moon = moon_equatorial(t);
        let (moon_dist_km, moon_diam_arcmin, hp_deg) = moon_distance_and_size(t);

        let (sun_alt, sun_az) = horizontal(&sun, site, t);
        let (moon_alt_geocentric, moon_az) = horizontal(&moon, site, t);
        let moon_alt = topocentric_altitude(moon_alt_geocentric, hp_deg);
        let elongation = angular_separation_deg(&sun, &moon);

        Ok(RawGeometry {
            moon_altitude_deg: moon_alt,
            moon_azimuth_deg: moon_az,
            sun_altitude_deg: sun_alt,
            sun_azimuth_deg: sun_az,
            elongation_deg: elongation,
            moon_phase_pct: 50.0 * (1.0 - elongation.to_radians().cos()),
            moon_distance_au: moon_dist_km / KM_PER_AU,
            moon_angular_diameter_arcmin: moon_diam_arcmin,
        })
    }

    fn next_setting(
        &self,
        body: Body,
        site: &Site,
        after: ObservationInstant,
        horizon_dip_deg: f64,
    ) -> Result<SettingTime, EphemerisError> {
        self.check_range(after)?;

        let semidiameter_deg = match body {
            Body::Sun => sun_semidiameter_deg(after.utc()),
            Body::Moon => moon_distance_and_size(after.utc()).1 / 120.0,
        };
        let target_alt_deg =
            -(HORIZON_REFRACTION_ARCMIN / 60.0) - semidiameter_deg - horizon_dip_deg;

        let steps = SETTING_SCAN_WINDOW_HOURS * 60 / SETTING_SCAN_STEP_MINUTES;
        let mut prev_t = after.utc();
        let mut prev_f = self.altitude_above_setting(body, site, prev_t, target_alt_deg);
        let mut saw_above = prev_f > 0.0;
        let mut saw_below = prev_f <= 0.0;

        for i in 1..=steps {
            let t = after.utc() + Duration::minutes(i * SETTING_SCAN_STEP_MINUTES);
            let f = self.altitude_above_setting(body, site, t, target_alt_deg);
            if prev_f > 0.0 && f <= 0.0 {
                let crossing = self.bisect_setting(body, site, prev_t, t, target_alt_deg);
                log::debug!(
                    "{body} setting at {site} found: {crossing}",
                    site = site.name
                );
                return Ok(SettingTime::At(ObservationInstant::new(crossing)));
            }
            saw_above |= f > 0.0;
            saw_below |= f <= 0.0;
            prev_t = t;
            prev_f = f;
        }

        if saw_above && !saw_below {
            return Ok(SettingTime::AlwaysUp);
        }
        if saw_below && !saw_above {
            return Ok(SettingTime::NeverRises);
        }
        Err(EphemerisError::Search(format!(
            "no {body} setting at {} within {SETTING_SCAN_WINDOW_HOURS}h of {after}",
            site.name
        )))
    }

    fn previous_new_moon(
        &self,
        before: ObservationInstant,
    ) -> Result<ObservationInstant, EphemerisError> {
        self.check_range(before)?;

        let steps = CONJUNCTION_SCAN_WINDOW_DAYS * 24 / CONJUNCTION_SCAN_STEP_HOURS;
        let mut later_t = before.utc();
        let mut later_f = self.phase_angle_deg(later_t);

        for i in 1..=steps {
            let earlier_t = before.utc() - Duration::hours(i * CONJUNCTION_SCAN_STEP_HOURS);
            let earlier_f = self.phase_angle_deg(earlier_t);
            // A genuine conjunction bracket crosses zero upward; the wrap
            // at opposition shows up as a jump larger than 180 degrees.
            if earlier_f < 0.0 && later_f >= 0.0 && (later_f - earlier_f).abs() < 180.0 {
                let crossing = self.bisect_conjunction(earlier_t, later_t);
                log::debug!("new moon before {before} found: {crossing}");
                return Ok(ObservationInstant::new(crossing));
            }
            later_t = earlier_t;
            later_f = earlier_f;
        }

        Err(EphemerisError::Search(format!(
            "no conjunction within {CONJUNCTION_SCAN_WINDOW_DAYS} days before {before}"
        )))
    }

    fn name(&self) -> &'static str {
        "practical-astronomy"
    }
}

// ==================== Positional queries ====================

struct Equatorial {
    ra_deg: f64,
    dec_deg: f64,
}

/// Split an instant into the clock fields the pa routines take.
fn pa_clock(t: DateTime<Utc>) -> (f64, f64, f64, f64, u32, u32) {
    let hh = t.hour() as f64;
    let mm = t.minute() as f64;
    let ss = t.second() as f64 + (t.timestamp_subsec_micros() as f64) / 1.0e6;
    (hh, mm, ss, t.day() as f64, t.month(), t.year() as u32)
}

fn sun_equatorial(t: DateTime<Utc>) -> Equatorial {
    let (hh, mm, ss, d, mo, y) = pa_clock(t);
    let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s) =
        pa_sun::precise_position_of_sun(hh, mm, ss, d, mo, y, false, 0);
    Equatorial {
        ra_deg: hms_to_deg(ra_h, ra_m, ra_s),
        dec_deg: dms_to_deg(dec_d, dec_m, dec_s),
    }
}

fn moon_equatorial(t: DateTime<Utc>) -> Equatorial {
    let (hh, mm, ss, d, mo, y) = pa_clock(t);
    let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s, _el, _par) =
        pa_moon::precise_position_of_moon(hh, mm, ss, false, 0, d, mo, y);
    Equatorial {
        ra_deg: hms_to_deg(ra_h, ra_m, ra_s),
        dec_deg: dms_to_deg(dec_d, dec_m, dec_s),
    }
}

/// Distance in km, apparent angular diameter in arc minutes and
/// equatorial horizontal parallax in degrees.
fn moon_distance_and_size(t: DateTime<Utc>) -> (f64, f64, f64) {
    let (hh, mm, ss, d, mo, y) = pa_clock(t);
    let (dist_km, ang_deg, ang_min, ang_sec, hp_deg, hp_min) =
        pa_moon::moon_dist_ang_diam_hor_parallax(hh, mm, ss, false, 0, d, mo, y);
    (
        dist_km,
        ang_deg * 60.0 + ang_min + ang_sec / 60.0,
        hp_deg + hp_min / 60.0,
    )
}

fn sun_semidiameter_deg(t: DateTime<Utc>) -> f64 {
    let (hh, mm, ss, d, mo, y) = pa_clock(t);
    let (_dist_km, ang_deg, ang_min, ang_sec) =
        pa_sun::sun_distance_and_angular_size(hh, mm, ss, d, mo, y, false, 0);
    (ang_deg + ang_min / 60.0 + ang_sec / 3600.0) / 2.0
}

// ==================== Frame conversions ====================

/// Greenwich mean sidereal time in degrees.
fn gmst_deg(t: DateTime<Utc>) -> f64 {
    let a = (14 - t.month() as i32) / 12;
    let y = t.year() + 4800 - a;
    let m = t.month() as i32 + 12 * a - 3;
    let jdn = t.day() as i32 + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045;
    let dayfrac = (t.hour() as f64
        + t.minute() as f64 / 60.0
        + (t.second() as f64 + (t.timestamp_subsec_micros() as f64) / 1.0e6) / 3600.0)
        / 24.0;
    // The day number above is noon-based; the half-day shift puts jd at
    // midnight before adding the clock fraction.
    let jd = jdn as f64 - 0.5 + dayfrac;
    let d = jd - 2451545.0;
    let tc = d / 36525.0;
    let gmst = 280.46061837 + 360.98564736629 * d + 0.000387933 * tc * tc - tc * tc * tc / 38710000.0;
    unwind_deg(gmst)
}

/// Horizontal coordinates (altitude, azimuth) in degrees for an
/// equatorial position seen from `site` at `t`. Azimuth is north-based,
/// increasing eastward.
fn horizontal(eq: &Equatorial, site: &Site, t: DateTime<Utc>) -> (f64, f64) {
    let lst = unwind_deg(gmst_deg(t) + site.longitude_deg);
    let h = unwind_deg(lst - eq.ra_deg).to_radians();
    let lat = site.latitude_deg.to_radians();
    let dec = eq.dec_deg.to_radians();

    let alt = (lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos()).asin();
    let az_south = h.sin().atan2(h.cos() * lat.sin() - dec.tan() * lat.cos());
    let az = (az_south.to_degrees() + 180.0).rem_euclid(360.0);

    (alt.to_degrees(), az)
}

/// First-order parallax-in-altitude correction.
fn topocentric_altitude(geocentric_alt_deg: f64, horizontal_parallax_deg: f64) -> f64 {
    geocentric_alt_deg - horizontal_parallax_deg * geocentric_alt_deg.to_radians().cos()
}

fn angular_separation_deg(a: &Equatorial, b: &Equatorial) -> f64 {
    let ra1 = a.ra_deg.to_radians();
    let ra2 = b.ra_deg.to_radians();
    let d1 = a.dec_deg.to_radians();
    let d2 = b.dec_deg.to_radians();

    let cos_sep = d1.sin() * d2.sin() + d1.cos() * d2.cos() * (ra1 - ra2).cos();
    cos_sep.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Geocentric ecliptic longitude in degrees for an equatorial position.
fn ecliptic_longitude_deg(eq: &Equatorial) -> f64 {
    let ra = eq.ra_deg.to_radians();
    let dec = eq.dec_deg.to_radians();
    let eps = OBLIQUITY_DEG.to_radians();

    let lon = (ra.sin() * eps.cos() + dec.tan() * eps.sin()).atan2(ra.cos());
    unwind_deg(lon.to_degrees())
}

fn unwind_deg(mut x: f64) -> f64 {
    x %= 360.0;
    if x < 0.0 {
        x += 360.0;
    }
    x
}

fn normalize_to_pm180(deg: f64) -> f64 {
    let mut x = deg % 360.0;
    if x > 180.0 {
        x -= 360.0;
    } else if x < -180.0 {
        x += 360.0;
    }
    x
}

fn hms_to_deg(h: f64, m: f64, s: f64) -> f64 {
    (h + m / 60.0 + s / 3600.0) * 15.0
}

fn dms_to_deg(d: f64, m: f64, s: f64) -> f64 {
    // A negative zero degree field still means a southern declination.
    let sign = if d.is_sign_negative() { -1.0 } else { 1.0 };
    sign * (d.abs() + m.abs() / 60.0 + s.abs() / 3600.0)
}
