//! Dashboard error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// INTERNAL_ERROR
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct DashboardError {
    pub kind: DashboardErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum DashboardErrorKind {
    InternalError(String),
}

impl DashboardError {
    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: DashboardErrorKind::InternalError(message),
            request_id,
        }
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DashboardErrorKind::InternalError(msg) => write!(f, "[{}] Internal Error: {}", self.request_id, msg),
        }
    }
}

impl std::error::Error for DashboardError {}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self.kind {
            DashboardErrorKind::InternalError(msg) => {
                tracing::error!(request_id = %self.request_id, error = %msg, "Dashboard request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_internal_error_response() {
        let response = DashboardError::internal_error("req-1".to_string(), "disk gone".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.request_id, "req-1");
        assert_eq!(parsed.error.code, "INTERNAL_ERROR");
        assert_eq!(parsed.error.message, "disk gone");
    }
}
