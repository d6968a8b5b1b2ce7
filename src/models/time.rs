use std::fmt;
use std::ops::{Add, Sub};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::*;

/// A single UTC instant carried through the visibility pipeline.
///
/// Every internal computation (sunset search, geometry sampling, moon age)
/// happens on UTC instants; conversion to a civil clock face is a
/// presentation step done at the very end via [`shifted_by_hours`].
///
/// [`shifted_by_hours`]: ObservationInstant::shifted_by_hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservationInstant(DateTime<Utc>);

impl ObservationInstant {
    /// Wrap a UTC datetime.
    pub fn new(utc: DateTime<Utc>) -> Self {
        Self(utc)
    }

    /// Create from a Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    ///
    /// Returns `None` for timestamps outside chrono's representable range.
    pub fn from_timestamp(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// The underlying UTC datetime.
    pub fn utc(&self) -> DateTime<Utc> {
        self.0
    }

    /// Unix timestamp in whole seconds.
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    /// Civil clock face after applying a fixed offset in hours.
    ///
    /// Fractional offsets are honoured to the second, so half-hour and
    /// 45-minute zones shift correctly.
    pub fn shifted_by_hours(&self, offset_hours: f64) -> NaiveDateTime {
        let shift = Duration::seconds((offset_hours * 3600.0).round() as i64);
        (self.0 + shift).naive_utc()
    }

    /// Signed number of whole minutes from `self` to `later`, rounded
    /// half away from zero.
    pub fn minutes_until(&self, later: ObservationInstant) -> i64 {
        let secs = (later.0 - self.0).num_seconds() as f64;
        (secs / 60.0).round() as i64
    }
}

impl Sub for ObservationInstant {
    type Output = Duration;

    fn sub(self, rhs: ObservationInstant) -> Duration {
        self.0 - rhs.0
    }
}

impl Add<Duration> for ObservationInstant {
    type Output = ObservationInstant;

    fn add(self, rhs: Duration) -> ObservationInstant {
        ObservationInstant(self.0 + rhs)
    }
}

impl Sub<Duration> for ObservationInstant {
    type Output = ObservationInstant;

    fn sub(self, rhs: Duration) -> ObservationInstant {
        ObservationInstant(self.0 - rhs)
    }
}

impl fmt::Display for ObservationInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

/// Elapsed time since the preceding new moon, split into whole hours and
/// whole minutes by truncation. Seconds are discarded, never rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoonAge {
    pub hours: i64,
    pub minutes: i64,
}

impl MoonAge {
    /// Split a duration into truncated hours and minutes.
    ///
    /// Negative durations clamp to zero; the age of a crescent observed
    /// after conjunction is never negative.
    pub fn from_duration(age: Duration) -> Self {
        let total_secs = age.num_seconds().max(0);
        Self {
            hours: total_secs / 3600,
            minutes: (total_secs % 3600) / 60,
        }
    }

    /// Age between conjunction and an observation instant.
    pub fn between(new_moon: ObservationInstant, observed: ObservationInstant) -> Self {
        Self::from_duration(observed - new_moon)
    }
}

impl fmt::Display for MoonAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hrs {} mins", self.hours, self.minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::{MoonAge, ObservationInstant};
    use chrono::Duration;
    use proptest::prelude::*;

    fn instant(secs: i64) -> ObservationInstant {
        ObservationInstant::from_timestamp(secs).unwrap()
    }

    #[test]
    fn test_instant_from_timestamp() {
        let t = instant(0);
        assert_eq!(t.timestamp(), 0);
        assert_eq!(t.to_string(), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_instant_ordering() {
        let earlier = instant(1_000);
        let later = instant(2_000);

        assert!(earlier < later);
        assert!(later > earlier);
    }

    #[test]
    fn test_instant_difference_is_duration() {
        let earlier = instant(1_000);
        let later = instant(4_600);

        assert_eq!(later - earlier, Duration::seconds(3_600));
    }

    #[test]
    fn test_instant_add_sub_duration() {
        let t = instant(10_000);
        let shifted = t + Duration::minutes(90);

        assert_eq!(shifted.timestamp(), 10_000 + 90 * 60);
        assert_eq!(shifted - Duration::minutes(90), t);
    }

    #[test]
    fn test_minutes_until_rounds_half_up() {
        let t = instant(0);

        // 89.5 minutes rounds away from zero.
        assert_eq!(t.minutes_until(instant(5_370)), 90);
        // 89.4 minutes rounds down.
        assert_eq!(t.minutes_until(instant(5_364)), 89);
    }

    #[test]
    fn test_minutes_until_negative() {
        let t = instant(5_370);
        assert_eq!(t.minutes_until(instant(0)), -90);
    }

    #[test]
    fn test_shift_whole_hours() {
        // 13:04:33 UTC + 5h = 18:04:33 on the civil clock.
        let t = instant(13 * 3600 + 4 * 60 + 33);
        let local = t.shifted_by_hours(5.0);

        assert_eq!(local.format("%H:%M:%S").to_string(), "18:04:33");
    }

    #[test]
    fn test_shift_fractional_hours() {
        // Nepal-style +5:45 offset.
        let t = instant(12 * 3600);
        let local = t.shifted_by_hours(5.75);

        assert_eq!(local.format("%H:%M").to_string(), "17:45");
    }

    #[test]
    fn test_shift_negative_offset() {
        let t = instant(3 * 3600);
        let local = t.shifted_by_hours(-4.0);

        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "1969-12-31 23:00");
    }

    #[test]
    fn test_shift_round_trip_recovers_instant() {
        let t = instant(1_740_834_273);
        for offset in [5.0, 5.75, -9.5, 0.0] {
            let there = t.shifted_by_hours(offset);
            let back = ObservationInstant::new(there.and_utc()).shifted_by_hours(-offset);
            assert_eq!(back.and_utc().timestamp(), t.timestamp());
        }
    }

    #[test]
    fn test_age_truncates_seconds() {
        // 1h 30m 29s keeps 1h 30m; the odd seconds are dropped.
        let age = MoonAge::from_duration(Duration::seconds(5_429));
        assert_eq!(age, MoonAge { hours: 1, minutes: 30 });
    }

    #[test]
    fn test_age_just_under_an_hour() {
        let age = MoonAge::from_duration(Duration::seconds(3_599));
        assert_eq!(age, MoonAge { hours: 0, minutes: 59 });
    }

    #[test]
    fn test_age_exact_hour() {
        let age = MoonAge::from_duration(Duration::seconds(3_600));
        assert_eq!(age, MoonAge { hours: 1, minutes: 0 });
    }

    #[test]
    fn test_age_negative_clamps_to_zero() {
        let age = MoonAge::from_duration(Duration::seconds(-120));
        assert_eq!(age, MoonAge { hours: 0, minutes: 0 });
    }

    #[test]
    fn test_age_between_instants() {
        let conjunction = instant(0);
        let observed = instant(37 * 3600 + 23 * 60 + 12);

        let age = MoonAge::between(conjunction, observed);
        assert_eq!(age, MoonAge { hours: 37, minutes: 23 });
        assert_eq!(age.to_string(), "37 hrs 23 mins");
    }

    #[test]
    fn test_instant_serde_roundtrip() {
        let t = instant(1_740_400_000);
        let json = serde_json::to_string(&t).unwrap();
        let back: ObservationInstant = serde_json::from_str(&json).unwrap();

        assert_eq!(t, back);
    }

    proptest! {
        #[test]
        fn prop_age_fields_stay_in_range(secs in -100_000..10_000_000i64) {
            let age = MoonAge::from_duration(Duration::seconds(secs));
            prop_assert!(age.hours >= 0);
            prop_assert!((0..60).contains(&age.minutes));
        }

        #[test]
        fn prop_age_truncates_never_rounds_up(secs in 0..10_000_000i64) {
            let age = MoonAge::from_duration(Duration::seconds(secs));
            let rebuilt = age.hours * 3_600 + age.minutes * 60;
            prop_assert!(rebuilt <= secs);
            prop_assert!(secs - rebuilt < 60);
        }
    }
}
