//! Hospital geocoding through Kakao Local keyword search.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Path of the keyword search endpoint.
const KEYWORD_SEARCH_PATH: &str = "v2/local/search/keyword.json";

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Place name as known to the provider.
    pub name: String,
    /// Street or lot address.
    pub address: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Looks up the position of a hospital by name.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Find the best match for a hospital name.
    ///
    /// Returns `Ok(None)` when the provider has no match.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn locate(&self, name: &str) -> Result<Option<Location>>;
}

/// Keyword search response.
#[derive(Debug, Deserialize)]
struct KeywordResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

/// One keyword search result. Coordinates come back as strings.
#[derive(Debug, Deserialize)]
struct Document {
    place_name: String,
    #[serde(default)]
    address_name: String,
    x: String,
    y: String,
}

impl TryFrom<Document> for Location {
    type Error = Error;

    fn try_from(doc: Document) -> Result<Self> {
        let coordinate = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    Error::unexpected_payload(format!("bad {axis} coordinate {value:?}"))
                })
        };

        Ok(Self {
            lat: coordinate(&doc.y, "y")?,
            lon: coordinate(&doc.x, "x")?,
            name: doc.place_name,
            address: doc.address_name,
        })
    }
}

/// Client for the Kakao Local API.
#[derive(Debug, Clone)]
pub struct KakaoClient {
    http: reqwest::Client,
    endpoint: Url,
    rest_key: String,
    category_group_code: String,
}

impl KakaoClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        rest_key: impl Into<String>,
        category_group_code: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = format!("{}/{KEYWORD_SEARCH_PATH}", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| Error::ConfigValidation {
            message: format!("invalid geocoding URL {endpoint}: {e}"),
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("erbeds/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            rest_key: rest_key.into(),
            category_group_code: category_group_code.into(),
        })
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if no REST key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config
            .geocode
            .rest_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingCredential {
                name: "Kakao REST API key",
                env_var: "ERBEDS_GEOCODE__REST_KEY",
            })?;
        Self::new(
            &config.geocode.base_url,
            key,
            config.geocode.category_group_code.clone(),
            config.geocode_timeout(),
        )
    }
}

#[async_trait]
impl Geocoder for KakaoClient {
    async fn locate(&self, name: &str) -> Result<Option<Location>> {
        debug!(hospital = name, "Geocoding hospital");

        let response: KeywordResponse = self
            .http
            .get(self.endpoint.clone())
            .header(AUTHORIZATION, format!("KakaoAK {}", self.rest_key))
            .query(&[
                ("query", name),
                ("category_group_code", self.category_group_code.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .documents
            .into_iter()
            .next()
            .map(Location::try_from)
            .transpose()
    }
}
