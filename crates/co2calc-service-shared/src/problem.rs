//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>
//!
//! Every problem also carries an `error` member with a human-readable message,
//! and geocoding failures set `fallbackToManual` so clients can switch to
//! manual distance entry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use co2calc_lib::Error as LibError;

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for places that could not be geocoded.
pub const PROBLEM_GEOCODING_FAILED: &str = "/problems/geocoding-failed";

/// Problem type URI for an external provider that failed or timed out.
pub const PROBLEM_UPSTREAM_UNAVAILABLE: &str = "/problems/upstream-unavailable";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

const GEOCODING_FALLBACK_MESSAGE: &str =
    "Could not determine the distance automatically. Please enter the distance manually.";

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error while calculating emissions";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use co2calc_service_shared::{ProblemDetails, PROBLEM_INVALID_REQUEST};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_INVALID_REQUEST,
///     "Invalid Request",
///     StatusCode::BAD_REQUEST,
/// )
/// .with_detail("distance must be a finite number greater than zero, got -5")
/// .with_request_id("req-12345");
///
/// assert_eq!(problem.error, problem.detail.clone().unwrap());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Message for clients that only look for an `error` string.
    pub error: String,

    /// Set when the client should ask the user for a manual distance.
    #[serde(
        rename = "fallbackToManual",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub fallback_to_manual: Option<bool>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        let title = title.into();
        Self {
            type_uri: type_uri.into(),
            error: title.clone(),
            title,
            status: status.as_u16(),
            detail: None,
            instance: None,
            fallback_to_manual: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    /// Add a detailed explanation; also becomes the `error` message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.error = detail.clone();
        self.detail = Some(detail);
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 400 problem telling the client to fall back to manual distance.
    ///
    /// `reason` explains which place failed; the `error` member keeps the
    /// user-facing instruction.
    pub fn geocoding_failed(reason: impl Into<String>, request_id: impl Into<String>) -> Self {
        let mut problem = Self::new(
            PROBLEM_GEOCODING_FAILED,
            "Geocoding Failed",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(reason)
        .with_request_id(request_id);
        problem.error = GEOCODING_FALLBACK_MESSAGE.to_string();
        problem.fallback_to_manual = Some(true);
        problem
    }

    /// Create a 502 Bad Gateway problem for a failing external provider.
    pub fn upstream_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UPSTREAM_UNAVAILABLE,
            "Upstream Unavailable",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    ///
    /// The message is fixed; callers log the underlying cause instead.
    pub fn internal_error(request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(INTERNAL_ERROR_MESSAGE)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

/// Implement IntoResponse for axum to return ProblemDetails as HTTP responses.
impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors from the trip pipeline to ProblemDetails.
///
/// Geocoding failures become the manual-fallback problem; input errors
/// become 400s carrying the library's message.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::Validation { .. }
        | LibError::InvalidMode { .. }
        | LibError::InvalidDistance { .. }
        | LibError::InvalidCoordinate { .. } => {
            ProblemDetails::bad_request(error.to_string(), request_id)
        }
        LibError::NotFound { .. } => ProblemDetails::geocoding_failed(error.to_string(), request_id),
        LibError::Upstream { .. } | LibError::Http(_) => ProblemDetails::geocoding_failed(
            "The geocoding service is unavailable",
            request_id,
        ),
    }
}

/// Metric label describing why a request failed.
pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::Validation { .. } | LibError::InvalidCoordinate { .. } => "validation_error",
        LibError::InvalidMode { .. } => "invalid_mode",
        LibError::InvalidDistance { .. } => "invalid_distance",
        LibError::NotFound { .. } => "geocoding_not_found",
        LibError::Upstream { .. } | LibError::Http(_) => "geocoding_unavailable",
    }
}
