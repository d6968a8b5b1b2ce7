//! Multi-station sweep: evaluate a network for one evening, isolate
//! per-station failures and pick the reporting site.
//!
//! Station selection follows the network's operating rule: the report
//! comes from the lowest-elevation station that produced a result, the
//! station with the flattest western horizon. Ties keep the first
//! station in input order.

use chrono::NaiveDate;

use super::crescent::compute_visibility;
use super::sunset::locate_sunset;
use super::{round_dp, VisibilityError};
use crate::api::{
    BatchOutcome, SelectedObservation, Site, StationFailure, StationReport, VisibilityResult,
};
use crate::ephemeris::Ephemeris;

/// Options shared by every station in a sweep.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    /// Hours added to UTC for the display clock faces
    pub display_offset_hours: f64,
    /// Extra horizon depression for setting searches, in degrees
    pub horizon_dip_deg: f64,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            display_offset_hours: 5.0,
            horizon_dip_deg: 0.0,
        }
    }
}

/// Evaluate one station for the requested evening.
///
/// A failure carries the station identity and the reason; it never
/// aborts the sweep the station is part of.
pub fn evaluate_station(
    provider: &dyn Ephemeris,
    site: &Site,
    date: NaiveDate,
    options: &AggregateOptions,
) -> Result<StationReport, StationFailure> {
    let run = || -> Result<VisibilityResult, VisibilityError> {
        let sunset = locate_sunset(provider, site, date, options.horizon_dip_deg)?;
        compute_visibility(provider, site, sunset, options.horizon_dip_deg)
    };

    match run() {
        Ok(result) => Ok(station_report(site, result, options)),
        Err(error) => {
            log::warn!("station {} dropped from sweep: {error}", site.name);
            Err(StationFailure::new(&site.name, &error))
        }
    }
}

/// Sweep a network sequentially and select the reporting station.
pub fn aggregate(
    provider: &dyn Ephemeris,
    sites: &[Site],
    date: NaiveDate,
    options: &AggregateOptions,
) -> BatchOutcome {
    let mut reports = Vec::with_capacity(sites.len());
    let mut failures = Vec::new();

    for site in sites {
        match evaluate_station(provider, site, date, options) {
            Ok(report) => reports.push(report),
            Err(failure) => failures.push(failure),
        }
    }

    let selected = select_lowest_station(&reports);
    log::info!(
        "swept {} stations for {date}: {} reported, {} failed",
        sites.len(),
        reports.len(),
        failures.len()
    );

    BatchOutcome {
        reports,
        failures,
        selected,
    }
}

/// Pick the lowest-elevation station; first in input order wins ties.
///
/// Returns `None` when no station produced a report.
pub fn select_lowest_station(reports: &[StationReport]) -> Option<SelectedObservation> {
    let best = reports.iter().min_by(|a, b| {
        a.elevation_m
            .partial_cmp(&b.elevation_m)
            .unwrap_or(std::cmp::Ordering::Equal)
    })?;

    Some(SelectedObservation {
        station: best.station.clone(),
        moon_age: best.moon_age,
        conjunction_date: best.conjunction_local.date(),
        conjunction_time: best.conjunction_local.time(),
    })
}

fn station_report(site: &Site, result: VisibilityResult, options: &AggregateOptions) -> StationReport {
    let moonset_instant = result.moonset.instant();

    StationReport {
        station: site.name.clone(),
        latitude_deg: site.latitude_deg,
        longitude_deg: site.longitude_deg,
        elevation_m: site.elevation_m,
        sunset_local: result.sunset.shifted_by_hours(options.display_offset_hours),
        moonset_local: moonset_instant.map(|t| t.shifted_by_hours(options.display_offset_hours)),
        conjunction_local: result
            .conjunction
            .shifted_by_hours(options.display_offset_hours),
        lag_minutes: moonset_instant.map(|t| result.sunset.minutes_until(t)),
        moon_age: result.moon_age,
        moon_altitude_deg: round_dp(result.moon_altitude_deg, 2),
        moon_azimuth_deg: round_dp(result.moon_azimuth_deg, 2),
        sun_azimuth_deg: round_dp(result.sun_azimuth_deg, 2),
        arcv_deg: round_dp(result.arcv_deg, 2),
        daz_deg: round_dp(result.daz_deg, 2),
        q_value: result.q_value,
        category: result.category,
        geometry: result,
    }
}
