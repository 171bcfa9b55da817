//! Error types for erbeds.
//!
//! This module defines all error types used throughout the erbeds crate,
//! providing detailed context for debugging and user-friendly error messages.

use thiserror::Error;

/// The main error type for erbeds operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// An API credential needed to build a client is not configured.
    #[error("missing credential: {name} (set {env_var})")]
    MissingCredential {
        /// Human-readable name of the credential.
        name: &'static str,
        /// Environment variable that supplies it.
        env_var: &'static str,
    },

    // === Upstream Errors ===
    /// The HTTP request to an upstream API failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API answered with a non-success result code.
    #[error("upstream error {code}: {message}")]
    Upstream {
        /// Result code reported by the upstream API.
        code: String,
        /// Result message reported by the upstream API.
        message: String,
    },

    /// The upstream payload did not have the expected shape.
    #[error("unexpected upstream payload: {message}")]
    UnexpectedPayload {
        /// Description of what was wrong with the payload.
        message: String,
    },

    // === Lookup Errors ===
    /// The requested hospital does not exist in the fetched data.
    #[error("hospital not found: {id}")]
    NotFound {
        /// Institution id that was looked up.
        id: String,
    },

    // === I/O Errors ===
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for erbeds operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an upstream result-code error.
    #[must_use]
    pub fn upstream(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected payload error.
    #[must_use]
    pub fn unexpected_payload(message: impl Into<String>) -> Self {
        Self::UnexpectedPayload {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given institution id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Check if this error means the requested hospital does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from talking to an upstream API.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Upstream { .. } | Self::UnexpectedPayload { .. }
        )
    }
}
