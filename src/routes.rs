use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::shared::AppError;

/// Home route, kept from the original API surface
pub async fn home() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "geoshare location sharing API",
    }))
}

/// Health check route
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Server is healthy",
    }))
}

/// Fallback for unknown routes: JSON error envelope instead of a bare 404
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
