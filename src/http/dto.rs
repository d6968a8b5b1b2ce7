//! Request and response bodies for the REST API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::VisibilityResult;

/// GET /health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Name of the ephemeris backend serving this deployment.
    pub ephemeris: String,
}

/// POST /v1/visibility request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityRequest {
    /// Geographic latitude in decimal degrees, north positive.
    pub latitude: f64,
    /// Geographic longitude in decimal degrees, east positive.
    pub longitude: f64,
    /// Elevation above sea level in meters.
    #[serde(default)]
    pub elevation: f64,
    /// Evening to assess, formatted dd-mm-yyyy.
    pub date: String,
    /// IANA timezone name used for the local clock faces.
    pub timezone: String,
    /// Optional label echoed back in the response and used in logs.
    #[serde(default)]
    pub city: Option<String>,
}

/// POST /v1/visibility response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityResponse {
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub timezone: String,
    /// Sunset on the requested timezone's clock.
    pub sunset_local: NaiveDateTime,
    /// Moonset on the requested timezone's clock, absent on polar outcomes.
    pub moonset_local: Option<NaiveDateTime>,
    /// Conjunction on the requested timezone's clock.
    pub conjunction_local: NaiveDateTime,
    /// Whole minutes from sunset to moonset, absent on polar outcomes.
    pub lag_minutes: Option<i64>,
    /// Full engine output with UTC instants.
    pub result: VisibilityResult,
}

/// POST /v1/visibility/batch request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Evening to assess, formatted dd-mm-yyyy.
    pub date: String,
    /// Stations to sweep. When omitted the deployment's network is used.
    #[serde(default)]
    pub sites: Option<Vec<StationDto>>,
    /// Override for the display clock offset, in hours.
    #[serde(default)]
    pub display_offset_hours: Option<f64>,
    /// Override for the horizon dip, in degrees.
    #[serde(default)]
    pub horizon_dip_deg: Option<f64>,
}

/// One caller-supplied station in a batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDto {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_request_defaults_optional_fields() {
        let request: VisibilityRequest = serde_json::from_str(
            r#"{
                "latitude": 24.8607,
                "longitude": 67.0011,
                "date": "01-03-2025",
                "timezone": "Asia/Karachi"
            }"#,
        )
        .unwrap();

        assert_eq!(request.elevation, 0.0);
        assert!(request.city.is_none());
    }

    #[test]
    fn test_batch_request_with_only_date_is_valid() {
        let request: BatchRequest = serde_json::from_str(r#"{"date": "01-03-2025"}"#).unwrap();
        assert!(request.sites.is_none());
        assert!(request.display_offset_hours.is_none());
        assert!(request.horizon_dip_deg.is_none());
    }

    #[test]
    fn test_station_dto_defaults_elevation() {
        let dto: StationDto = serde_json::from_str(
            r#"{"name": "Jiwani", "latitude": 25.0671, "longitude": 61.8053}"#,
        )
        .unwrap();
        assert_eq!(dto.elevation, 0.0);
    }
}
