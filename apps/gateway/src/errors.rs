use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::tenant::DirectoryError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The handler was reached without passing through the tenant middleware.
    #[error("Tenant context missing")]
    MissingTenant,

    #[error("Tenant directory error: {0}")]
    Directory(#[from] DirectoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::MissingTenant => {
                tracing::error!("Handler reached without a resolved tenant");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TENANT_CONTEXT_MISSING",
                    "Tenant context was not resolved for this request".to_string(),
                )
            }
            AppError::Directory(e) => {
                tracing::error!("Tenant directory error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DIRECTORY_UNAVAILABLE",
                    "The tenant directory is temporarily unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_tenant_maps_to_500_envelope() {
        let response = AppError::MissingTenant.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "TENANT_CONTEXT_MISSING");
    }

    #[test]
    fn test_directory_error_maps_to_503() {
        let err = AppError::from(DirectoryError::Unavailable("connection refused".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("tenant acme".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
