//! Sunset location: turns a site and calendar date into the best-time
//! evaluation instant.
//!
//! Crescent sighting reports are judged at local sunset on the evening of
//! the requested day. The service anchors the day at the site's nominal
//! zone (one hour per 15 degrees of longitude), then asks the ephemeris
//! for the first sunset after that local midnight.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::VisibilityError;
use crate::api::Site;
use crate::ephemeris::{Body, Ephemeris, SettingTime};
use crate::models::ObservationInstant;

/// UTC instant of civil midnight opening the requested day at `site`.
///
/// A request for 01-03-2025 at Karachi means that calendar day in
/// Pakistan, not at Greenwich; anchoring the search at local midnight
/// keeps the found sunset on the requested evening for any longitude.
pub fn local_midnight_utc(site: &Site, date: NaiveDate) -> ObservationInstant {
    let zone_hours = (site.longitude_deg / 15.0).round() as i64;
    let midnight = NaiveDateTime::new(date, NaiveTime::MIN).and_utc();
    ObservationInstant::new(midnight - Duration::hours(zone_hours))
}

/// Find the sunset closing the requested calendar day at `site`.
///
/// Polar sites can go weeks without a sunset; those evenings surface as
/// the dedicated error variants rather than a fabricated instant.
pub fn locate_sunset(
    provider: &dyn Ephemeris,
    site: &Site,
    date: NaiveDate,
    horizon_dip_deg: f64,
) -> Result<ObservationInstant, VisibilityError> {
    let midnight = local_midnight_utc(site, date);
    match provider.next_setting(Body::Sun, site, midnight, horizon_dip_deg)? {
        SettingTime::At(sunset) => Ok(sunset),
        SettingTime::AlwaysUp => Err(VisibilityError::SunAlwaysUp {
            site: site.name.clone(),
        }),
        SettingTime::NeverRises => Err(VisibilityError::SunNeverRises {
            site: site.name.clone(),
        }),
    }
}
