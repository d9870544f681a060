//! API error handling
//!
//! Upstream failures never reach the browser in detail. Users see a short
//! message with the request's correlation code; the full status and body go
//! to the log under that same code.

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use integration_mbta::MbtaError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::middleware::RequestId;
use crate::templates::{TemplateEngine, TemplateError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown URL or entity; the message is shown as-is
    #[error("Not found: {0}")]
    NotFound(String),

    /// The MBTA API answered with an unexpected status
    #[error("Unexpected MBTA response: HTTP {status_code}")]
    UpstreamResponse { status_code: u16, body: String },

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status returned to the client
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamResponse { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Machine-readable error kind
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::UpstreamResponse { .. } => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show to users
    #[must_use]
    pub fn public_message(&self, request_id: RequestId) -> String {
        match self {
            Self::NotFound(msg) => msg.clone(),
            Self::UpstreamResponse { .. } => format!(
                "Got an unexpected response from the MBTA API. Check the logs for code: {request_id}"
            ),
            Self::Internal(_) => {
                format!("An unexpected error occurred. Check the logs for code: {request_id}")
            },
        }
    }

    /// Log the full error under the request's code
    pub fn log(&self, request_id: RequestId) {
        match self {
            Self::NotFound(msg) => debug!(%request_id, "{msg}"),
            Self::UpstreamResponse { status_code, body } => error!(
                %request_id,
                status_code,
                body = %body,
                "Unexpected response {status_code} ({body}). Code {request_id}"
            ),
            Self::Internal(msg) => {
                error!(%request_id, error = %msg, "Unknown error {request_id}");
            },
        }
    }

    /// Pair with the request id for a JSON response
    #[must_use]
    pub fn json(self, request_id: RequestId) -> JsonError {
        JsonError {
            error: self,
            request_id,
        }
    }

    /// Pair with the request id and templates for an HTML error page
    #[must_use]
    pub fn page(self, request_id: RequestId, templates: &TemplateEngine) -> PageError {
        PageError {
            error: self,
            request_id,
            templates: templates.clone(),
        }
    }
}

impl From<MbtaError> for ApiError {
    fn from(err: MbtaError) -> Self {
        match err {
            MbtaError::UnexpectedServerResponse { status_code, body } => {
                Self::UpstreamResponse { status_code, body }
            },
            MbtaError::NotFound { id } => Self::NotFound(format!("Route not found: {id}")),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error kind
    pub code: String,
    /// Correlation code to look up in the logs
    pub request_id: String,
}

/// An [`ApiError`] rendered as JSON
#[derive(Debug)]
pub struct JsonError {
    pub error: ApiError,
    pub request_id: RequestId,
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        self.error.log(self.request_id);

        let body = ErrorResponse {
            error: self.error.public_message(self.request_id),
            code: self.error.code().to_string(),
            request_id: self.request_id.to_string(),
        };

        (self.error.status_code(), Json(body)).into_response()
    }
}

/// An [`ApiError`] rendered as the HTML error page
#[derive(Debug)]
pub struct PageError {
    pub error: ApiError,
    pub request_id: RequestId,
    templates: TemplateEngine,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.error.log(self.request_id);

        let status = self.error.status_code();
        let msg = self.error.public_message(self.request_id);

        match self.templates.render_error(&msg) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!(request_id = %self.request_id, error = %e, "Failed to render error page");
                (status, msg).into_response()
            },
        }
    }
}

/// Attach the request context to fallible handler results
pub trait ResultExt<T> {
    /// Convert the error for a JSON endpoint
    fn or_json(self, request_id: RequestId) -> Result<T, JsonError>;

    /// Convert the error for an HTML page
    fn or_page(self, request_id: RequestId, templates: &TemplateEngine) -> Result<T, PageError>;
}

impl<T, E: Into<ApiError>> ResultExt<T> for Result<T, E> {
    fn or_json(self, request_id: RequestId) -> Result<T, JsonError> {
        self.map_err(|e| e.into().json(request_id))
    }

    fn or_page(self, request_id: RequestId, templates: &TemplateEngine) -> Result<T, PageError> {
        self.map_err(|e| e.into().page(request_id, templates))
    }
}
