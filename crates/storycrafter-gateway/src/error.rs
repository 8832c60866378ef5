//! Error types for the Gateway

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use storycrafter_agent::GenerationError;
use storycrafter_core::CoreError;
use thiserror::Error;

/// Gateway error type
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::BadRequest(_) | GatewayError::Conflict(_) => StatusCode::BAD_REQUEST,
            GatewayError::Generation(e) => match e {
                GenerationError::ProviderUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                GenerationError::ProviderError { .. } | GenerationError::EmptyCompletion { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                GenerationError::UnsupportedProvider(_) | GenerationError::InvalidRequest(_) => {
                    StatusCode::BAD_REQUEST
                }
            },
            GatewayError::InvalidConfig(_)
            | GatewayError::Io(_)
            | GatewayError::Serialization(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side failures are not echoed back.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::AuthenticationFailed(msg)
            | GatewayError::NotFound(msg)
            | GatewayError::BadRequest(msg)
            | GatewayError::Conflict(msg) => msg.clone(),
            GatewayError::Generation(e) => e.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Serialization(e.to_string())
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(e: anyhow::Error) -> Self {
        GatewayError::Internal(format!("{:#}", e))
    }
}

impl From<CoreError> for GatewayError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EmptyRequirement
            | CoreError::UnknownMode(_)
            | CoreError::UnknownArtifactKind(_) => GatewayError::BadRequest(e.to_string()),
            CoreError::Serialization(e) => GatewayError::Serialization(e.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(serde_json::json!({ "detail": self.detail() }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Result type for Gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
