//! HTTP client for the `ErmctInfoInqireService` public-data API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use super::{extract_body, BedQuery, BedSource};
use crate::config::Config;
use crate::error::{Error, Result};

/// Operation returning real-time available beds.
const OPERATION: &str = "getEmrrmRltmUsefulSckbdInfoInqire";

/// Client for the public bed-availability API.
#[derive(Debug, Clone)]
pub struct PublicDataClient {
    http: reqwest::Client,
    endpoint: Url,
    service_key: String,
}

impl PublicDataClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, service_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = format!("{}/{OPERATION}", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| Error::ConfigValidation {
            message: format!("invalid bed API URL {endpoint}: {e}"),
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("erbeds/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            service_key: service_key.into(),
        })
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if no service key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config
            .beds
            .service_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingCredential {
                name: "public data service key",
                env_var: "ERBEDS_BEDS__SERVICE_KEY",
            })?;
        Self::new(&config.beds.base_url, key, config.beds_timeout())
    }

    /// Build the request URL for a query.
    ///
    /// The service key is placed first and left exactly as configured:
    /// data.go.kr hands out keys that are already percent-encoded, and
    /// encoding them again makes the API reject them.
    #[must_use]
    pub fn request_url(&self, query: &BedQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("STAGE1", &query.region.stage1)
            .append_pair("STAGE2", &query.region.stage2)
            .append_pair("pageNo", "1")
            .append_pair("numOfRows", &query.rows.to_string())
            .append_pair("_type", "json");

        let params = url.query().unwrap_or_default().to_string();
        url.set_query(Some(&format!("serviceKey={}&{params}", self.service_key)));
        url
    }
}

#[async_trait]
impl BedSource for PublicDataClient {
    async fn fetch_body(&self, query: &BedQuery) -> Result<Value> {
        debug!(region = %query.region, rows = query.rows, "Requesting bed availability");

        let envelope: Value = self
            .http
            .get(self.request_url(query))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        extract_body(envelope)
    }
}
