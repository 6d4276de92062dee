//! Consistent error responses.
//!
//! Authorization failures answer with the checker's own `{code, description}`
//! payload. Everything else uses the `{success, error, message}` envelope,
//! where `error` is the numeric status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use coffeeshop_auth::AuthError;
use coffeeshop_core::DomainError;
use coffeeshop_infra::StoreError;

/// API error type that converts to the appropriate HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No drink with the requested id.
    #[error("drink not found")]
    DrinkNotFound,

    /// No route matched.
    #[error("resource not found")]
    RouteNotFound,

    /// Request body missing, malformed or failing validation.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// A drink with the same title exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Reading the drink list failed.
    #[error("failed to retrieve drinks: {0}")]
    Retrieval(String),

    /// Any other storage or internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Collapse a store failure during a read into the generic retrieval error.
    pub fn retrieval(err: StoreError) -> Self {
        Self::Retrieval(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::DrinkNotFound,
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Corrupt(_) | StoreError::Backend(_) => Self::Internal(value.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Unprocessable(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Auth(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::UNAUTHORIZED);
                if status.is_server_error() {
                    tracing::error!(error = ?err, "signing keys unavailable");
                }
                return (status, Json(err.body())).into_response();
            }
            Self::DrinkNotFound => (StatusCode::NOT_FOUND, "Drink not found".to_string()),
            Self::RouteNotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            Self::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Retrieval(err) => {
                tracing::error!(error = %err, "drink retrieval failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to retrieve drinks".to_string(),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        json_error(status, message)
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": status.as_u16(),
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn auth_errors_use_checker_payload() {
        let response = ApiError::from(AuthError::Forbidden("post:drinks".into())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({"code": "unauthorized", "description": "Permission not found."})
        );
    }

    #[tokio::test]
    async fn validation_maps_to_422_envelope() {
        let response = ApiError::from(DomainError::validation("title cannot be empty")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": 422, "message": "title cannot be empty"})
        );
    }

    #[tokio::test]
    async fn storage_failures_hide_the_cause() {
        let response =
            ApiError::from(StoreError::Backend("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[test]
    fn store_not_found_is_drink_not_found() {
        assert!(matches!(ApiError::from(StoreError::NotFound), ApiError::DrinkNotFound));
    }
}
