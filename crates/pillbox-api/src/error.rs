//! Error types for the HTTP API.
//!
//! [`ApiError`] covers every way a request can fail. Bodies are short
//! plain-text messages, which is what the companion app expects from the
//! submission endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more of the required query parameters is absent.
    #[error("Missing parameters")]
    MissingParameters,

    /// A numeric parameter did not parse as an integer.
    #[error("Invalid parameters")]
    InvalidParameters {
        /// The offending parameter.
        field: &'static str,
    },

    /// The device loop did not accept or confirm the submission.
    #[error("Device unavailable")]
    DeviceUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingParameters | Self::InvalidParameters { .. } => StatusCode::BAD_REQUEST,
            Self::DeviceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}
