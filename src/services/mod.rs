//! Business logic for crescent visibility assessment.
//!
//! Three services sit on top of the ephemeris trait:
//! - `sunset`: locates the evaluation instant (sunset) for a site and date
//! - `crescent`: runs the Yallop q-test geometry chain at that instant
//! - `stations`: sweeps a station network and selects the reporting site
//!
//! All services are synchronous; the HTTP layer moves them onto blocking
//! worker threads.

pub mod crescent;
pub mod stations;
pub mod sunset;

pub use crescent::compute_visibility;
pub use stations::{aggregate, evaluate_station, select_lowest_station, AggregateOptions};
pub use sunset::{local_midnight_utc, locate_sunset};

use thiserror::Error;

use crate::ephemeris::EphemerisError;

/// Errors from evaluating a single site and date.
///
/// The polar variants are domain outcomes, not provider failures: the
/// requested evening simply has no sunset to evaluate at.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VisibilityError {
    /// The sun stays above the horizon around the requested evening.
    #[error("the sun never sets at {site} around the requested date")]
    SunAlwaysUp { site: String },

    /// The sun stays below the horizon around the requested evening.
    #[error("the sun never rises at {site} around the requested date")]
    SunNeverRises { site: String },

    /// The ephemeris provider failed.
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

/// Round to a fixed number of decimal places, half away from zero.
pub(crate) fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
