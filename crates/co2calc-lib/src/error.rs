use thiserror::Error;

use crate::transport::TransportMode;

/// Convenient result alias for the co2calc library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input field was missing or blank.
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// The geocoding provider returned zero matches for the query.
    #[error("no location found for '{query}'")]
    NotFound { query: String },

    /// An external provider was unreachable, timed out, or returned malformed data.
    #[error("upstream service failure: {message}")]
    Upstream { message: String },

    /// Raised when a transport mode is not part of the canonical set.
    #[error("invalid transport mode '{mode}'; choose one of: {}", expected_modes())]
    InvalidMode { mode: String },

    /// Raised when a distance is zero, negative, or not finite.
    #[error("distance must be a finite number greater than zero, got {value}")]
    InvalidDistance { value: f64 },

    /// Raised when a coordinate lies outside the valid latitude/longitude range.
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Wrapper for HTTP client errors (connection refused, TLS, body decode).
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// True when the error came out of geocoding and the caller should offer
    /// manual distance entry instead of failing the request.
    pub fn is_geocoding_failure(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::Upstream { .. } | Error::Http(_)
        )
    }

    /// True when repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Upstream { .. } | Error::Http(_))
    }

    /// True when the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::InvalidMode { .. }
                | Error::InvalidDistance { .. }
                | Error::InvalidCoordinate { .. }
        )
    }

    pub(crate) fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream {
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}

fn expected_modes() -> String {
    TransportMode::ALL
        .iter()
        .map(|mode| mode.key())
        .collect::<Vec<_>>()
        .join(", ")
}
