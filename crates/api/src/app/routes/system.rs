use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::app::errors::ApiError;

pub async fn index() -> &'static str {
    "Hello, World!"
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
