//! Real-time ER bed availability from the public-data API.
//!
//! The upstream service wraps its rows in an envelope:
//!
//! ```text
//! { "response": { "header": { "resultCode": "00", "resultMsg": "..." },
//!                 "body": { "items": { "item": ... }, "totalCount": n, ... } } }
//! ```
//!
//! [`BedSource`] implementations return the `body` verbatim; the helpers in
//! this module turn it into [`Hospital`] records.

mod client;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hospital::{Hospital, RawHospital};
use crate::region::RegionQuery;

pub use client::PublicDataClient;

/// Result code the upstream API uses for success.
pub const RESULT_OK: &str = "00";

/// Parameters of one bed-availability request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedQuery {
    /// Region filter.
    pub region: RegionQuery,
    /// Number of rows to request.
    pub rows: u32,
}

impl BedQuery {
    /// Create a query for a region.
    #[must_use]
    pub fn new(region: RegionQuery, rows: u32) -> Self {
        Self { region, rows }
    }

    /// Create a nationwide query.
    #[must_use]
    pub fn nationwide(rows: u32) -> Self {
        Self::new(RegionQuery::nationwide(), rows)
    }
}

/// A source of bed-availability payloads.
#[async_trait]
pub trait BedSource: Send + Sync {
    /// Fetch the upstream `response.body` for a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the upstream API reports a
    /// non-success result code.
    async fn fetch_body(&self, query: &BedQuery) -> Result<Value>;
}

/// Unwrap the upstream envelope, returning `response.body`.
///
/// # Errors
///
/// Returns [`Error::Upstream`] for a non-`00` result code and
/// [`Error::UnexpectedPayload`] when the envelope is malformed.
pub fn extract_body(mut envelope: Value) -> Result<Value> {
    let response = envelope
        .get_mut("response")
        .ok_or_else(|| Error::unexpected_payload("missing `response`"))?;

    let header = response
        .get("header")
        .ok_or_else(|| Error::unexpected_payload("missing `response.header`"))?;
    let code = header
        .get("resultCode")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if code != RESULT_OK {
        let message = header
            .get("resultMsg")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(Error::upstream(code, message));
    }

    response
        .get_mut("body")
        .map(Value::take)
        .ok_or_else(|| Error::unexpected_payload("missing `response.body`"))
}

/// Extract the hospital rows from a `response.body`.
///
/// `items.item` is an object when exactly one row matches and an array
/// otherwise; with no rows `items` is an empty string or absent.
///
/// # Errors
///
/// Returns an error if `items` has an unexpected shape or a row does not
/// deserialize.
pub fn hospitals_from_body(body: &Value) -> Result<Vec<RawHospital>> {
    let item = match body.get("items") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::Object(items)) => items.get("item"),
        Some(other) => {
            return Err(Error::unexpected_payload(format!(
                "`items` is neither an object nor empty: {other}"
            )))
        }
    };

    match item {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(rows)) => rows
            .iter()
            .map(|row| RawHospital::deserialize(row).map_err(Error::from))
            .collect(),
        Some(row @ Value::Object(_)) => Ok(vec![RawHospital::deserialize(row)?]),
        Some(other) => Err(Error::unexpected_payload(format!(
            "`items.item` is neither an object nor an array: {other}"
        ))),
    }
}

/// Fetch and reshape the hospitals matching a query.
///
/// # Errors
///
/// Returns an error if the fetch fails or the payload cannot be read.
pub async fn fetch_hospitals(source: &dyn BedSource, query: &BedQuery) -> Result<Vec<Hospital>> {
    let body = source.fetch_body(query).await?;
    let hospitals: Vec<Hospital> = hospitals_from_body(&body)?
        .into_iter()
        .map(Hospital::from)
        .collect();
    debug!(
        region = %query.region,
        count = hospitals.len(),
        "Fetched hospitals"
    );
    Ok(hospitals)
}

/// Find a single hospital by institution id.
///
/// The upstream API has no by-id lookup, so this fetches `rows` hospitals
/// nationwide and searches them.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no fetched hospital has the id.
pub async fn find_hospital(source: &dyn BedSource, id: &str, rows: u32) -> Result<Hospital> {
    fetch_hospitals(source, &BedQuery::nationwide(rows))
        .await?
        .into_iter()
        .find(|h| h.id == id)
        .ok_or_else(|| Error::not_found(id))
}
