//! Route handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::error::{ApiError, FETCH_BEDS_FAILED, FETCH_LOCATION_FAILED, NAME_REQUIRED};
use super::AppState;
use crate::beds::{self, BedQuery};
use crate::enrich;
use crate::geocode::Location;
use crate::hospital::Hospital;
use crate::region::{self, Province, RegionQuery};
use crate::view::{self, HospitalDetail, HospitalList, MapView};

/// Largest row count accepted from a query string.
const MAX_ROWS: u32 = 1000;

/// Query parameters of `/api/beds`.
#[derive(Debug, Default, Deserialize)]
pub struct BedsParams {
    #[serde(default)]
    stage1: String,
    #[serde(default)]
    stage2: String,
    #[serde(default, rename = "numOfRows")]
    num_of_rows: Option<String>,
}

/// Query parameters of `/api/hospitals` and `/api/map`.
#[derive(Debug, Default, Deserialize)]
pub struct HospitalsParams {
    #[serde(flatten)]
    beds: BedsParams,
    #[serde(default)]
    search: String,
    #[serde(default)]
    locate: Option<String>,
}

/// Query parameters of `/api/hospital-location`.
#[derive(Debug, Default, Deserialize)]
pub struct LocationParams {
    #[serde(default)]
    name: Option<String>,
}

impl BedsParams {
    fn query(&self, default_rows: u32) -> BedQuery {
        BedQuery::new(
            RegionQuery::new(self.stage1.as_str(), self.stage2.as_str()),
            parse_rows(self.num_of_rows.as_deref(), default_rows),
        )
    }
}

/// Parse a row count, falling back to `default` for anything unusable.
fn parse_rows(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| (1..=MAX_ROWS).contains(n))
        .unwrap_or(default)
}

fn is_truthy(flag: Option<&str>) -> bool {
    matches!(
        flag.map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "1" | "yes")
    )
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /api/beds`: the upstream body, untouched.
pub async fn beds(
    State(state): State<AppState>,
    Query(params): Query<BedsParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params.query(state.config.beds.default_rows);
    info!(region = %query.region, rows = query.rows, "GET /api/beds");

    state
        .beds
        .fetch_body(&query)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(&e, FETCH_BEDS_FAILED))
}

/// `GET /api/hospital-location`
pub async fn hospital_location(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<Location>, ApiError> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ApiError::bad_request(NAME_REQUIRED))?;
    info!(hospital = name, "GET /api/hospital-location");

    let Some(geocoder) = state.geocoder.as_deref() else {
        warn!("Geocoding is not configured");
        return Err(ApiError::internal(FETCH_LOCATION_FAILED));
    };

    match geocoder.locate(name).await {
        Ok(Some(location)) => Ok(Json(location)),
        Ok(None) => Err(ApiError::not_found()),
        Err(e) => Err(ApiError::from_error(&e, FETCH_LOCATION_FAILED)),
    }
}

/// `GET /api/hospitals`: cards and statistics.
pub async fn hospitals(
    State(state): State<AppState>,
    Query(params): Query<HospitalsParams>,
) -> Result<Json<HospitalList>, ApiError> {
    let (region, hospitals) = load_hospitals(&state, &params).await?;
    Ok(Json(HospitalList::new(region, &params.search, &hospitals)))
}

/// `GET /api/hospitals/:id`
pub async fn hospital_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HospitalDetail>, ApiError> {
    info!(id = %id, "GET /api/hospitals/:id");

    let hospital = beds::find_hospital(state.beds.as_ref(), &id, state.config.beds.detail_rows)
        .await
        .map_err(|e| ApiError::from_error(&e, FETCH_BEDS_FAILED))?;
    Ok(Json(HospitalDetail::from(&hospital)))
}

/// `GET /api/map`: markers for the same list `/api/hospitals` returns.
pub async fn map(
    State(state): State<AppState>,
    Query(params): Query<HospitalsParams>,
) -> Result<Json<MapView>, ApiError> {
    let (_, hospitals) = load_hospitals(&state, &params).await?;
    Ok(Json(MapView::new(&state.config.map, &hospitals)))
}

/// `GET /api/regions`
pub async fn regions() -> Json<&'static [Province]> {
    Json(region::catalog())
}

async fn load_hospitals(
    state: &AppState,
    params: &HospitalsParams,
) -> Result<(RegionQuery, Vec<Hospital>), ApiError> {
    let query = params.beds.query(state.config.beds.default_rows);
    let locate = is_truthy(params.locate.as_deref());
    info!(
        region = %query.region,
        rows = query.rows,
        search = %params.search,
        locate,
        "Listing hospitals"
    );

    let fetched = beds::fetch_hospitals(state.beds.as_ref(), &query)
        .await
        .map_err(|e| ApiError::from_error(&e, FETCH_BEDS_FAILED))?;
    let mut hospitals = view::search(fetched, &params.search);

    if locate {
        match state.geocoder.as_deref() {
            Some(geocoder) => {
                enrich::locate_all(geocoder, &mut hospitals, state.config.geocode_delay()).await;
            }
            None => warn!("Geocoding is not configured; returning hospitals without positions"),
        }
    }

    Ok((query.region, hospitals))
}
