//! HTTP handlers for the REST API.

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use chrono_tz::Tz;
use futures::future::join_all;

use super::dto::{
    BatchRequest, HealthResponse, StationDto, VisibilityRequest, VisibilityResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{BatchOutcome, FailureKind, ObservationInstant, Site, StationFailure};
use crate::services::{self, AggregateOptions};

/// Convenience alias for handler return types.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ephemeris: state.ephemeris.name().to_string(),
    }))
}

// ============================================================================
// Single-site visibility
// ============================================================================

/// POST /v1/visibility
///
/// Runs the full crescent assessment for one site and renders the event
/// times on the requested timezone's clock.
pub async fn assess_visibility(
    State(state): State<AppState>,
    Json(request): Json<VisibilityRequest>,
) -> HandlerResult<VisibilityResponse> {
    let date = parse_request_date(&request.date)?;
    let tz = parse_timezone(&request.timezone)?;
    if request.elevation < 0.0 {
        return Err(AppError::BadRequest(
            "Elevation must be non-negative".to_string(),
        ));
    }

    let label = request
        .city
        .clone()
        .unwrap_or_else(|| "custom site".to_string());
    let site = Site::new(label, request.latitude, request.longitude, request.elevation)
        .map_err(AppError::BadRequest)?;

    let provider = state.ephemeris.clone();
    let dip = state.config.horizon_dip_deg;
    let task_site = site.clone();
    let result = tokio::task::spawn_blocking(move || {
        let sunset = services::locate_sunset(provider.as_ref(), &task_site, date, dip)?;
        services::compute_visibility(provider.as_ref(), &task_site, sunset, dip)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    let moonset = result.moonset.instant();
    Ok(Json(VisibilityResponse {
        city: request.city,
        latitude: site.latitude_deg,
        longitude: site.longitude_deg,
        elevation: site.elevation_m,
        timezone: request.timezone,
        sunset_local: zone_clock(result.sunset, tz),
        moonset_local: moonset.map(|t| zone_clock(t, tz)),
        conjunction_local: zone_clock(result.conjunction, tz),
        lag_minutes: moonset.map(|t| result.sunset.minutes_until(t)),
        result,
    }))
}

// ============================================================================
// Station sweep
// ============================================================================

/// POST /v1/visibility/batch
///
/// Evaluates every station for the given evening. Stations are independent,
/// so each one runs on its own blocking task and a failure never aborts the
/// rest of the sweep.
pub async fn sweep_network(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> HandlerResult<BatchOutcome> {
    let date = parse_request_date(&request.date)?;
    let options = AggregateOptions {
        display_offset_hours: request
            .display_offset_hours
            .unwrap_or(state.config.display_offset_hours),
        horizon_dip_deg: request
            .horizon_dip_deg
            .unwrap_or(state.config.horizon_dip_deg),
    };

    let sites = match request.sites {
        Some(dtos) => {
            if dtos.is_empty() {
                return Err(AppError::BadRequest(
                    "sites must not be empty when provided".to_string(),
                ));
            }
            dtos.into_iter()
                .map(site_from_dto)
                .collect::<Result<Vec<_>, _>>()?
        }
        None => state.stations.as_ref().clone(),
    };

    let (names, tasks): (Vec<_>, Vec<_>) = sites
        .into_iter()
        .map(|site| {
            let provider = state.ephemeris.clone();
            let name = site.name.clone();
            let task = tokio::task::spawn_blocking(move || {
                services::evaluate_station(provider.as_ref(), &site, date, &options)
            });
            (name, task)
        })
        .unzip();

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (name, joined) in names.into_iter().zip(join_all(tasks).await) {
        match joined {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(failure)) => failures.push(failure),
            Err(join_error) => failures.push(StationFailure {
                station: name,
                kind: FailureKind::Ephemeris,
                reason: format!("evaluation task failed: {}", join_error),
            }),
        }
    }

    let selected = services::select_lowest_station(&reports);
    Ok(Json(BatchOutcome {
        reports,
        failures,
        selected,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_request_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%d-%m-%Y").map_err(|_| {
        AppError::BadRequest(format!("Invalid date '{}', expected dd-mm-yyyy", raw))
    })
}

fn parse_timezone(raw: &str) -> Result<Tz, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown timezone '{}'", raw)))
}

fn zone_clock(at: ObservationInstant, tz: Tz) -> chrono::NaiveDateTime {
    at.utc().with_timezone(&tz).naive_local()
}

fn site_from_dto(dto: StationDto) -> Result<Site, AppError> {
    if dto.elevation < 0.0 {
        return Err(AppError::BadRequest(format!(
            "station '{}': elevation must be non-negative",
            dto.name
        )));
    }
    let name = dto.name.clone();
    Site::new(dto.name, dto.latitude, dto.longitude, dto.elevation)
        .map_err(|reason| AppError::BadRequest(format!("station '{}': {}", name, reason)))
}
