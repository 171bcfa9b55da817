//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::Error;

/// Message returned when bed data cannot be fetched.
pub const FETCH_BEDS_FAILED: &str = "Failed to fetch hospital data";
/// Message returned when a geocoding lookup fails.
pub const FETCH_LOCATION_FAILED: &str = "Failed to fetch location";
/// Message returned when no hospital matches.
pub const HOSPITAL_NOT_FOUND: &str = "Hospital not found";
/// Message returned when the location lookup has no name.
pub const NAME_REQUIRED: &str = "Hospital name is required";

/// An error surfaced to API clients as `{"error": message}`.
///
/// The message is always one of the fixed strings above; details of the
/// underlying failure only go to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    /// Create an error response.
    #[must_use]
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// 400 with the given message.
    #[must_use]
    pub const fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 for a missing hospital.
    #[must_use]
    pub const fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, HOSPITAL_NOT_FOUND)
    }

    /// 500 with the given message.
    #[must_use]
    pub const fn internal(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Log `err` and map it to a response.
    ///
    /// [`Error::NotFound`] becomes a 404; everything else is a 500 carrying
    /// `message`.
    pub fn from_error(err: &Error, message: &'static str) -> Self {
        if err.is_not_found() {
            return Self::not_found();
        }
        error!(error = %err, upstream = err.is_upstream(), "{message}");
        Self::internal(message)
    }

    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message placed in the body.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
