//! End-to-end tests for the sunset locator and crescent engine, driven by a
//! scripted ephemeris so every expected number is known exactly.

mod support;

use chrono::NaiveDate;
use hilal_rust::api::{MoonAge, VisibilityClass};
use hilal_rust::ephemeris::{Body, ScriptedEphemeris, SettingTime};
use hilal_rust::services::{self, VisibilityError};
use support::{instant, karachi, marginal_crescent, scripted_evening, NEW_MOON_UNIX, SUNSET_UNIX};

fn evening() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

#[test]
fn test_full_evening_assessment() {
    let site = karachi();
    let provider = scripted_evening(&site, marginal_crescent());

    let sunset = services::locate_sunset(&provider, &site, evening(), 0.0).unwrap();
    assert_eq!(sunset.timestamp(), SUNSET_UNIX);

    let result = services::compute_visibility(&provider, &site, sunset, 0.0).unwrap();

    assert_eq!(result.arcv_deg, 11.0);
    assert_eq!(result.daz_deg, 6.4);
    assert_eq!(result.elongation_deg, 12.0);
    assert_eq!(result.moon_phase_pct, 1.0934);
    assert_eq!(result.illumination_pct, 1.1);
    assert_eq!(result.crescent_width, 0.0001);
    assert_eq!(result.q_value, -0.08);
    assert_eq!(result.category, VisibilityClass::C);
    assert_eq!(
        result.moon_age,
        MoonAge {
            hours: 36,
            minutes: 19
        }
    );

    let lag = result
        .moonset
        .instant()
        .map(|t| result.sunset.minutes_until(t));
    assert_eq!(lag, Some(62));
}

#[test]
fn test_polar_moonset_is_reported_not_fatal() {
    let site = karachi();
    let provider = ScriptedEphemeris::new()
        .with_setting(Body::Sun, &site.name, SettingTime::At(instant(SUNSET_UNIX)))
        .with_setting(Body::Moon, &site.name, SettingTime::AlwaysUp)
        .with_geometry(&site.name, instant(SUNSET_UNIX), marginal_crescent())
        .with_new_moon(instant(NEW_MOON_UNIX));

    let sunset = services::locate_sunset(&provider, &site, evening(), 0.0).unwrap();
    let result = services::compute_visibility(&provider, &site, sunset, 0.0).unwrap();

    assert_eq!(result.moonset, SettingTime::AlwaysUp);
    assert!(result.moonset.instant().is_none());
    // The q-test still runs on the sunset geometry.
    assert_eq!(result.category, VisibilityClass::C);
}

#[test]
fn test_polar_day_is_a_typed_error() {
    let site = karachi();
    let provider =
        ScriptedEphemeris::new().with_setting(Body::Sun, &site.name, SettingTime::AlwaysUp);

    match services::locate_sunset(&provider, &site, evening(), 0.0) {
        Err(VisibilityError::SunAlwaysUp { site }) => assert_eq!(site, "Karachi"),
        other => panic!("expected SunAlwaysUp, got {other:?}"),
    }
}

#[test]
fn test_missing_script_surfaces_as_ephemeris_error() {
    let site = karachi();
    // Sunset is scripted but the geometry sample is not.
    let provider = ScriptedEphemeris::new().with_setting(
        Body::Sun,
        &site.name,
        SettingTime::At(instant(SUNSET_UNIX)),
    );

    let sunset = services::locate_sunset(&provider, &site, evening(), 0.0).unwrap();
    match services::compute_visibility(&provider, &site, sunset, 0.0) {
        Err(VisibilityError::Ephemeris(_)) => {}
        other => panic!("expected an ephemeris error, got {other:?}"),
    }
}

#[test]
fn test_result_serializes_with_tagged_setting_times() {
    let site = karachi();
    let provider = scripted_evening(&site, marginal_crescent());

    let sunset = services::locate_sunset(&provider, &site, evening(), 0.0).unwrap();
    let result = services::compute_visibility(&provider, &site, sunset, 0.0).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["moonset"]["status"], "at");
    assert!(json["moonset"]["time"].is_string());
    assert_eq!(json["q_value"], -0.08);
    assert_eq!(json["category"], "C");
    assert_eq!(json["moon_age"]["hours"], 36);
}
