//! Error types for airdash-core.
//!
//! Only transport and credential failures are errors here. Missing sensor
//! values travel as `None` through the calculators and formatters, and an
//! unknown metric name classifies to an empty colour; neither produces an
//! [`Error`].
//!
//! # Recovery Strategies
//!
//! | Error Type | Strategy | Rationale |
//! |------------|----------|-----------|
//! | [`Error::Request`] | Retry after fixed delay | Network failure, upstream may come back |
//! | [`Error::Http`] | Retry after fixed delay | Non-auth status, usually a server hiccup |
//! | [`Error::Decode`] | Retry after fixed delay | Truncated or proxied error page |
//! | [`Error::Auth`] | Stop polling, tell the user | Token rejected; retrying cannot help |
//! | [`Error::InvalidUrl`] | Do not retry | Fix the base URL and restart |
//! | [`Error::InvalidConfig`] | Do not retry | Fix configuration and restart |
//! | [`Error::Settings`] | Do not retry | Settings storage is unavailable |
//! | [`Error::Cancelled`] | Do not retry | A newer poll cycle replaced this one |
//!
//! The poll controller uses [`Error::is_auth`] and [`Error::is_transient`] to
//! pick between these.

use thiserror::Error;

/// Errors that can occur while fetching and polling measurements.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The upstream API rejected the token (HTTP 401 or 403).
    #[error("Authentication failed (HTTP {status}): invalid or expired token")]
    Auth {
        /// The HTTP status returned.
        status: u16,
    },

    /// The upstream API answered with a non-success, non-auth status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// The HTTP status returned.
        status: u16,
        /// Response body excerpt or reason phrase.
        message: String,
    },

    /// The request could not be completed (connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not a JSON array of locations.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Settings could not be read or written.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create an error for a non-success HTTP status.
    ///
    /// 401 and 403 map to [`Error::Auth`]; everything else to [`Error::Http`].
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status == 401 || status == 403 {
            Self::Auth { status }
        } else {
            Self::Http {
                status,
                message: message.into(),
            }
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether the token was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http { .. } => true,
            Error::Request(_) => true,
            Error::Decode(_) => true,
            Error::Auth { .. } => false,
            Error::InvalidUrl(_) => false,
            Error::InvalidConfig(_) => false,
            Error::Settings(_) => false,
            Error::Cancelled => false,
        }
    }
}

/// Result type alias using airdash-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
