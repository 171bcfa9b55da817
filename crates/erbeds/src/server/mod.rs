//! HTTP API.
//!
//! Proxies the public bed-availability API and the geocoding provider so
//! that API keys stay on the server, and serves the reshaped views built on
//! top of them.

mod error;
mod handlers;

use std::fmt;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::beds::{BedSource, PublicDataClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geocode::{Geocoder, KakaoClient};

pub use error::ApiError;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bed-availability source.
    pub beds: Arc<dyn BedSource>,
    /// Geocoder, absent when no key is configured.
    pub geocoder: Option<Arc<dyn Geocoder>>,
    /// Loaded configuration.
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("geocoder", &self.geocoder.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state from explicit parts.
    pub fn new(
        beds: Arc<dyn BedSource>,
        geocoder: Option<Arc<dyn Geocoder>>,
        config: Config,
    ) -> Self {
        Self {
            beds,
            geocoder,
            config: Arc::new(config),
        }
    }

    /// Build state with the real upstream clients.
    ///
    /// A missing geocoding key only disables the location features; a
    /// missing bed API key is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the bed client cannot be built.
    pub fn from_config(config: Config) -> Result<Self> {
        let beds: Arc<dyn BedSource> = Arc::new(PublicDataClient::from_config(&config)?);
        let geocoder: Option<Arc<dyn Geocoder>> = match KakaoClient::from_config(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e @ Error::MissingCredential { .. }) => {
                warn!(error = %e, "Hospital locations are disabled");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(beds, geocoder, config))
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/beds", get(handlers::beds))
        .route("/api/hospital-location", get(handlers::hospital_location))
        .route("/api/hospitals", get(handlers::hospitals))
        .route("/api/hospitals/:id", get(handlers::hospital_detail))
        .route("/api/map", get(handlers::map))
        .route("/api/regions", get(handlers::regions))
        .with_state(state)
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the clients cannot be built or the listener cannot be
/// bound.
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.bind_address()?;
    let state = AppState::from_config(config)?;

    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "erbeds listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeBeds, FakeGeocoder};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn items() -> Value {
        json!([
            {
                "dutyName": "서울대학교병원",
                "dutyTel3": "02-2072-2473",
                "hpid": "A1100010",
                "hv1": 5, "hv2": 2, "hv3": "1",
                "hv6": 3, "hvctayn": "Y", "hvmriayn": "N",
                "hvidate": "20241015103000"
            },
            {
                "dutyName": "강남세브란스병원",
                "hpid": "A1100014",
                "hv1": 0, "hv2": 0, "hv3": 0
            },
            {
                "dutyName": "Korea University Anam Hospital",
                "hpid": "A1100017",
                "hv1": "2", "hv2": "", "hv3": 1,
                "wgs84Lat": 37.587, "wgs84Lon": 127.026
            }
        ])
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.geocode.delay_ms = 0;
        config
    }

    fn app(beds: FakeBeds, geocoder: Option<FakeGeocoder>) -> (Router, Arc<FakeBeds>) {
        let beds = Arc::new(beds);
        let geocoder = geocoder.map(|g| Arc::new(g) as Arc<dyn Geocoder>);
        let state = AppState::new(beds.clone(), geocoder, test_config());
        (router(state), beds)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(FakeBeds::with_items(items()), None);
        let (status, body) = get_json(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_beds_passes_body_through() {
        let (router, beds) = app(FakeBeds::with_items(items()), None);
        let (status, body) = get_json(
            router,
            "/api/beds?stage1=%EC%84%9C%EC%9A%B8%ED%8A%B9%EB%B3%84%EC%8B%9C&numOfRows=20",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 3);
        assert_eq!(body["items"]["item"][0]["hpid"], "A1100010");

        let query = beds.last_query().unwrap();
        assert_eq!(query.region.stage1, "서울특별시");
        assert_eq!(query.rows, 20);
    }

    #[tokio::test]
    async fn test_beds_bad_rows_use_default() {
        let (router, beds) = app(FakeBeds::with_items(items()), None);
        let (status, _) = get_json(router, "/api/beds?numOfRows=lots").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(beds.last_query().unwrap().rows, 50);
    }

    #[tokio::test]
    async fn test_beds_upstream_failure() {
        let (router, _) = app(FakeBeds::failing(), None);
        let (status, body) = get_json(router, "/api/beds").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch hospital data" }));
    }

    #[tokio::test]
    async fn test_location_requires_name() {
        let geocoder = FakeGeocoder::new();
        let (router, _) = app(FakeBeds::with_items(items()), Some(geocoder));

        let (status, body) = get_json(router.clone(), "/api/hospital-location").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Hospital name is required" }));

        let (status, _) = get_json(router, "/api/hospital-location?name=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_location_found() {
        let geocoder = FakeGeocoder::new().found("Asan", 37.526, 127.108);
        let (router, _) = app(FakeBeds::with_items(items()), Some(geocoder));

        let (status, body) = get_json(router, "/api/hospital-location?name=Asan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Asan");
        assert_eq!(body["lat"], 37.526);
        assert_eq!(body["lon"], 127.108);
        assert_eq!(body["address"], "Asan address");
    }

    #[tokio::test]
    async fn test_location_not_found() {
        let (router, _) = app(FakeBeds::with_items(items()), Some(FakeGeocoder::new()));
        let (status, body) = get_json(router, "/api/hospital-location?name=Nowhere").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Hospital not found" }));
    }

    #[tokio::test]
    async fn test_location_failure() {
        let geocoder = FakeGeocoder::new().failing("Broken");
        let (router, _) = app(FakeBeds::with_items(items()), Some(geocoder));
        let (status, body) = get_json(router, "/api/hospital-location?name=Broken").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch location" }));
    }

    #[tokio::test]
    async fn test_location_without_geocoder() {
        let (router, _) = app(FakeBeds::with_items(items()), None);
        let (status, _) = get_json(router, "/api/hospital-location?name=Asan").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_hospitals_list() {
        let (router, _) = app(FakeBeds::with_items(items()), None);
        let (status, body) = get_json(router, "/api/hospitals").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["total_hospitals"], 3);
        assert_eq!(body["stats"]["total_beds"], 11);
        assert_eq!(body["stats"]["available_hospitals"], 2);
        assert_eq!(body["hospitals"][0]["badge"], "8 beds");
        assert_eq!(body["hospitals"][1]["badge"], "Full");
        assert_eq!(body["hospitals"][2]["tone"], "orange");
    }

    #[tokio::test]
    async fn test_hospitals_search() {
        let (router, _) = app(FakeBeds::with_items(items()), None);
        let (status, body) = get_json(router, "/api/hospitals?search=korea").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["search"], "korea");
        assert_eq!(body["stats"]["total_hospitals"], 1);
        assert_eq!(body["hospitals"][0]["id"], "A1100017");
    }

    #[tokio::test]
    async fn test_hospitals_upstream_failure() {
        let (router, _) = app(FakeBeds::failing(), None);
        let (status, body) = get_json(router, "/api/hospitals").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch hospital data");
    }

    #[tokio::test]
    async fn test_map_locates_when_asked() {
        let geocoder = FakeGeocoder::new().found("서울대학교병원", 37.579, 126.998);
        let (router, _) = app(FakeBeds::with_items(items()), Some(geocoder));

        let (_, body) = get_json(router.clone(), "/api/map").await;
        assert_eq!(body["markers"].as_array().unwrap().len(), 1);
        assert_eq!(body["markers"][0]["id"], "A1100017");

        let (status, body) = get_json(router, "/api/map?locate=true").await;
        assert_eq!(status, StatusCode::OK);
        let markers = body["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 2);
        assert!(body.get("bounds").is_some());
        assert_eq!(body["level"], 8);
    }

    #[tokio::test]
    async fn test_hospital_detail() {
        let (router, beds) = app(FakeBeds::with_items(items()), None);
        let (status, body) = get_json(router, "/api/hospitals/A1100010").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "서울대학교병원");
        assert_eq!(body["status_label"], "Available");
        assert_eq!(beds.last_query().unwrap().rows, 100);
        assert!(beds.last_query().unwrap().region.is_nationwide());
    }

    #[tokio::test]
    async fn test_hospital_detail_not_found() {
        let (router, _) = app(FakeBeds::with_items(items()), None);
        let (status, body) = get_json(router, "/api/hospitals/NOPE").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Hospital not found" }));
    }

    #[tokio::test]
    async fn test_regions() {
        let (router, _) = app(FakeBeds::with_items(items()), None);
        let (status, body) = get_json(router, "/api/regions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), region_count());
        assert!(body[0]["districts"].is_array());
    }

    fn region_count() -> usize {
        crate::region::catalog().len()
    }

    #[test]
    fn test_from_config_requires_bed_key() {
        let err = AppState::from_config(Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingCredential { .. }));
    }

    #[test]
    fn test_from_config_without_geocoder() {
        let mut config = Config::default();
        config.beds.service_key = Some("key".to_string());
        let state = AppState::from_config(config).unwrap();
        assert!(state.geocoder.is_none());
    }
}
