//! Error types for the API client and token stores.
//!
//! # Design
//!
//! - Structured errors with constant messages; context lives in fields.
//! - `ApiError` is what callers observe for every failed request, including 401s
//!   that the unauthorized interceptor has already acted on.
//! - `StoreError` never reaches API callers: token lookups recover locally.

use std::io;
use std::path::PathBuf;

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Result alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result alias for token store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client")]
    ClientBuild {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// A supplied root certificate could not be used.
    #[error("invalid root certificate")]
    Certificate {
        /// Static reason for the rejection.
        reason: &'static str,
        /// Underlying reqwest error, when parsing failed outright.
        source: Option<reqwest::Error>,
    },
    /// The request path could not be joined onto the base URL.
    #[error("invalid request path")]
    InvalidPath {
        /// Path that failed to join.
        path: String,
        /// Underlying URL parse error.
        source: url::ParseError,
    },
    /// No complete response was obtained (connect failure, TLS failure,
    /// timeout, truncated body).
    #[error("request could not be completed")]
    Transport {
        /// HTTP method of the failed request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The server answered with a 4xx or 5xx status.
    #[error("api responded with status {status}")]
    Status {
        /// Status returned by the server.
        status: StatusCode,
        /// Response body, kept verbatim for diagnostics.
        body: String,
    },
    /// A request body could not be serialised.
    #[error("failed to encode request body")]
    Encode {
        /// Request path the body was meant for.
        path: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// A successful response body could not be decoded.
    #[error("failed to decode response body")]
    Decode {
        /// Request path the body belonged to.
        path: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Input rejected before any request was sent.
    #[error("invalid request input")]
    Validation {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ApiError {
    /// Status code carried by the failure, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the failure is a 401 from the server.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the failure was caused by the request timeout elapsing.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Errors raised by token store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached at all.
    #[error("token store unavailable")]
    Unavailable {
        /// Static reason describing why the store is unavailable.
        reason: &'static str,
    },
    /// IO failure against a file-backed store.
    #[error("token store io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// File backing the store.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The persisted store contents are not a JSON object of strings.
    #[error("token store contents are corrupt")]
    Corrupt {
        /// File backing the store.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn status_error_exposes_status() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "{\"detail\":\"Invalid token\"}".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_unauthorized());
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "api responded with status 401 Unauthorized");
    }

    #[test]
    fn validation_error_has_no_status() {
        let err = ApiError::Validation {
            field: "year",
            reason: "out of range",
            value: Some("1999".to_string()),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "invalid request input");
    }

    #[test]
    fn store_errors_keep_sources() {
        let io_err = StoreError::Io {
            operation: "read",
            path: PathBuf::from("storage.json"),
            source: io::Error::other("disk"),
        };
        assert_eq!(io_err.to_string(), "token store io failure");
        assert!(io_err.source().is_some());

        let unavailable = StoreError::Unavailable {
            reason: "disabled",
        };
        assert_eq!(unavailable.to_string(), "token store unavailable");
        assert!(unavailable.source().is_none());
    }
}
