//! Shared fixtures and helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use hilal_rust::api::{ObservationInstant, Site};
use hilal_rust::ephemeris::{Body, RawGeometry, ScriptedEphemeris, SettingTime};

/// 2025-03-01 13:04:33 UTC, a plausible Karachi sunset.
pub const SUNSET_UNIX: i64 = 1_740_834_273;
/// 62 minutes after sunset.
pub const MOONSET_UNIX: i64 = SUNSET_UNIX + 62 * 60;
/// 2025-02-28 00:45:00 UTC, the new moon preceding that evening.
pub const NEW_MOON_UNIX: i64 = 1_740_703_500;

pub fn instant(unix: i64) -> ObservationInstant {
    ObservationInstant::from_timestamp(unix).expect("valid test timestamp")
}

pub fn karachi() -> Site {
    Site::new("Karachi", 24.8607, 67.0011, 10.0).expect("valid station")
}

pub fn jiwani() -> Site {
    Site::new("Jiwani", 25.0671, 61.8053, 0.0).expect("valid station")
}

pub fn quetta() -> Site {
    Site::new("Quetta", 30.1798, 66.9750, 1680.0).expect("valid station")
}

/// Geometry of a marginal crescent: scores q = -0.08, category C.
pub fn marginal_crescent() -> RawGeometry {
    RawGeometry {
        moon_altitude_deg: 10.0,
        moon_azimuth_deg: 262.5,
        sun_altitude_deg: -1.0,
        sun_azimuth_deg: 268.9,
        elongation_deg: 12.0,
        moon_phase_pct: 1.0934,
        moon_distance_au: 0.0025,
        moon_angular_diameter_arcmin: 31.0724,
    }
}

/// Scripts a complete evening for one site: sunset, moonset 62 minutes
/// later, the preceding new moon, and `geometry` at the sunset instant.
pub fn scripted_evening(site: &Site, geometry: RawGeometry) -> ScriptedEphemeris {
    script_site(ScriptedEphemeris::new(), site, geometry).with_new_moon(instant(NEW_MOON_UNIX))
}

/// Adds one station's evening to an existing script.
pub fn script_site(
    script: ScriptedEphemeris,
    site: &Site,
    geometry: RawGeometry,
) -> ScriptedEphemeris {
    script
        .with_setting(Body::Sun, &site.name, SettingTime::At(instant(SUNSET_UNIX)))
        .with_setting(Body::Moon, &site.name, SettingTime::At(instant(MOONSET_UNIX)))
        .with_geometry(&site.name, instant(SUNSET_UNIX), geometry)
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on the way out, unwinds included, and
/// serializes access to the process-global environment so parallel tests
/// never observe each other's overrides.
///
/// `changes` is a list of `(key, value)` pairs: `Some(v)` sets the
/// variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = EnvGuard::apply(changes);
    f()
}

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(key, _)| *key).collect();
        let saved = keys
            .into_iter()
            .map(|key| (key.to_string(), std::env::var(key).ok()))
            .collect();

        for (key, value) in changes {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }

        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}
