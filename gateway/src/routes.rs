//! Calculation API: request envelope, validation, and the handler that
//! drives the engine pipeline.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sky_ephemeris::time::tt_from_utc;
use transit_engine::{Observer, Request, TransitEvent};

use crate::AppState;

// ---- Envelope types ----

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    /// YYYY-MM-DD, UTC midnight
    pub start_date: String,
    /// YYYY-MM-DD, UTC midnight (exclusive)
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub events: Vec<TransitEvent>,
}

// ---- Errors ----

/// The only error that reaches callers; everything else degrades to an
/// empty or shorter event list.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
        }
    }
}

// ---- Validation ----

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()))
}

/// Range-check the envelope and convert to the engine's TT-domain request.
pub fn normalize(request: &CalculateRequest) -> Result<Request, ApiError> {
    if !(-90.0..=90.0).contains(&request.lat) {
        return Err(ApiError::BadRequest(
            "Latitude must be between -90 and 90".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&request.lon) {
        return Err(ApiError::BadRequest(
            "Longitude must be between -180 and 180".to_string(),
        ));
    }
    if !request.radius_km.is_finite() || request.radius_km <= 0.0 {
        return Err(ApiError::BadRequest(
            "Search radius must be positive".to_string(),
        ));
    }

    let start = parse_date(&request.start_date)?;
    let end = parse_date(&request.end_date)?;

    let midnight_tt = |date: NaiveDate| {
        // Dates are valid calendar days, so midnight always exists
        tt_from_utc(date.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc())
    };

    Ok(Request {
        observer: Observer::new(request.lat, request.lon),
        t0_tt: midnight_tt(start),
        t1_tt: midnight_tt(end),
        radius_km: request.radius_km,
    })
}

// ---- Handler ----

/// `POST /api/calculate`: normalize, load the registry, fan out the
/// evaluation on the blocking pool, return the sorted events.
pub async fn calculate(
    State(state): State<AppState>,
    Json(payload): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let request = normalize(&payload)?;

    let catalog = transit_engine::catalog::load(&state.engine).await;
    tracing::debug!(catalog_entries = catalog.len(), "registry loaded");

    let config = state.engine.as_ref().clone();
    let events = tokio::task::spawn_blocking(move || {
        transit_engine::run(&request, &catalog, &config)
    })
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("evaluation task failed: {e}");
        Vec::new()
    });

    tracing::info!(events = events.len(), "request complete");
    Ok(Json(CalculateResponse { events }))
}
