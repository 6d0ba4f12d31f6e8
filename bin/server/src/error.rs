//! Domain error types for server operations.
//!
//! `StartupError` covers everything that stops the process from serving.
//! `ApiError` maps gateway failures onto the fixed HTTP bodies clients
//! depend on; internal details only go to the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use concierge_conversation::GatewayError;
use rootcause::Report;
use serde_json::json;
use std::fmt;

/// Errors that abort server startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// A required configuration value is absent.
    ConfigMissing { key: &'static str },
    /// Configuration is present but could not be parsed.
    InvalidConfig { reason: String },
    /// The log directory could not be created.
    LogDir { path: String, reason: String },
    /// The assistant provider client could not be built.
    Provider,
    /// The assistant identity could not be resolved.
    Assistant,
    /// The listener could not be bound.
    Bind { addr: String, reason: String },
    /// The server stopped with an error.
    Serve { reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigMissing { key } => write!(f, "environment variable {key} is not set"),
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
            Self::LogDir { path, reason } => {
                write!(f, "failed to create log directory '{path}': {reason}")
            }
            Self::Provider => write!(f, "failed to initialize assistant provider"),
            Self::Assistant => write!(f, "failed to resolve assistant"),
            Self::Bind { addr, reason } => write!(f, "failed to bind to {addr}: {reason}"),
            Self::Serve { reason } => write!(f, "server error: {reason}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Which endpoint a failure came from. The 400 body differs per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Chat,
    Check,
}

/// A failed API request.
#[derive(Debug)]
pub struct ApiError {
    endpoint: Endpoint,
    report: Report<GatewayError>,
}

impl ApiError {
    #[must_use]
    pub fn new(endpoint: Endpoint, report: Report<GatewayError>) -> Self {
        Self { endpoint, report }
    }

    /// Returns the status code and body for this error.
    #[must_use]
    pub fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        match self.report.current_context() {
            GatewayError::InvalidRequest { .. } => match self.endpoint {
                Endpoint::Check => (StatusCode::BAD_REQUEST, json!({ "response": "error" })),
                Endpoint::Start | Endpoint::Chat => {
                    (StatusCode::BAD_REQUEST, json!({ "error": "Missing thread_id" }))
                }
            },
            GatewayError::ProviderUnavailable => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Assistant provider unavailable" }),
            ),
            GatewayError::ToolFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "response": "error" }),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(endpoint = ?self.endpoint, error = %self.report, "Request failed");
        } else {
            tracing::debug!(endpoint = ?self.endpoint, error = %self.report, "Rejected request");
        }
        (status, Json(body)).into_response()
    }
}
