//! Error types and their HTTP mapping for the TripFlow backend

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can report.
///
/// The `Display` text is exactly what the caller sees in the `error` field of the
/// response body.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Required input missing or malformed
    #[error("{message}")]
    Validation { message: String },

    /// A server-side credential or setting is absent
    #[error("{message}")]
    Configuration { message: String },

    /// An upstream provider answered with a non-success status
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Network failure, timeout, or an unreadable upstream payload
    #[error("{message}")]
    Transport { message: String },
}

impl ProxyError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new upstream error carrying the status to answer with
    pub fn upstream<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Validation { .. } => StatusCode::BAD_REQUEST,
            ProxyError::Configuration { .. } | ProxyError::Transport { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Upstream { status, .. } => *status,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{self}");
        } else {
            tracing::warn!(status = status.as_u16(), "{self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = ProxyError::validation("lat and lng are required");
        assert!(matches!(validation_err, ProxyError::Validation { .. }));

        let config_err = ProxyError::configuration("Server missing API key");
        assert!(matches!(config_err, ProxyError::Configuration { .. }));

        let transport_err = ProxyError::transport("connection refused");
        assert!(matches!(transport_err, ProxyError::Transport { .. }));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProxyError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::configuration("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ProxyError::transport("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ProxyError::upstream(StatusCode::FORBIDDEN, "x").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_message_is_passed_through_verbatim() {
        let err = ProxyError::upstream(StatusCode::BAD_REQUEST, "No matching location found.");
        assert_eq!(err.to_string(), "No matching location found.");
    }

    #[tokio::test]
    async fn test_into_response_body_shape() {
        let response = ProxyError::validation("Missing data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Missing data" }));
    }
}
