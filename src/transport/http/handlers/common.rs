use crate::error::EngineError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub fn engine_error_response(err: EngineError) -> Response {
    let status = match &err {
        EngineError::ModelNotFound(_) | EngineError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::SessionExists(_) => StatusCode::CONFLICT,
        EngineError::InvalidDescriptor(_) | EngineError::CountOverflow(_) => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, Json(ApiResponse::err(err.to_string()))).into_response()
}

pub fn ok_response<T: Serialize>(data: &T) -> Response {
    match serde_json::to_value(data) {
        Ok(v) => (StatusCode::OK, Json(ApiResponse::ok(v))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(format!("Failed to encode response: {}", e))),
        )
            .into_response(),
    }
}

/// Rejects thresholds outside 0..=100 (and NaN).
pub fn check_threshold(threshold: Option<f64>) -> Result<(), Response> {
    match threshold {
        Some(t) if !(0.0..=100.0).contains(&t) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err(format!(
                "threshold must be between 0 and 100, got {}",
                t
            ))),
        )
            .into_response()),
        _ => Ok(()),
    }
}
