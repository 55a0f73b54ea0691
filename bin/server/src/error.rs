//! HTTP error responses.
//!
//! Every failure leaves the server as a JSON body
//! `{"message": ..., "status_code": ...}`. Service failures are mapped by
//! category; anything unclassified becomes a 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keyhole_access::ServiceError;
use rootcause::Report;
use serde::Serialize;
use std::fmt;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    status_code: u16,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 500 error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<Report<ServiceError>> for ApiError {
    fn from(report: Report<ServiceError>) -> Self {
        let error = report.current_context();
        let status = match error {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Verification { .. } | ServiceError::Parse { .. } => {
                StatusCode::FORBIDDEN
            }
            ServiceError::Creation { .. }
            | ServiceError::Upstream { .. }
            | ServiceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %report, "request failed");
        } else {
            tracing::debug!(error = %report, "request rejected");
        }

        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            status_code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: ServiceError) -> StatusCode {
        ApiError::from(Report::from(error)).status()
    }

    #[test]
    fn service_categories_map_to_status() {
        let reason = || "r".to_string();
        assert_eq!(
            status_of(ServiceError::NotFound { reason: reason() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::Verification { reason: reason() }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::Parse { reason: reason() }),
            StatusCode::FORBIDDEN
        );
        for error in [
            ServiceError::Creation { reason: reason() },
            ServiceError::Upstream { reason: reason() },
            ServiceError::Internal { reason: reason() },
        ] {
            assert_eq!(status_of(error), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn message_keeps_the_category_reason() {
        let error = ApiError::from(Report::from(ServiceError::Parse {
            reason: "invalid token length".to_string(),
        }));
        assert_eq!(
            error.message(),
            "could not parse resource: invalid token length"
        );
    }

    #[tokio::test]
    async fn body_is_message_and_status_code() {
        let response =
            ApiError::new(StatusCode::FORBIDDEN, "invalid state parameter").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(
            body,
            serde_json::json!({"message": "invalid state parameter", "status_code": 403})
        );
    }
}
