use crate::domain::model::ModelRegistry;
use crate::domain::session::SessionManager;
use crate::domain::validation::ArrayValidator;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub model_registry: Arc<ModelRegistry>,
    pub array_validator: Arc<ArrayValidator>,
    pub session_manager: Arc<SessionManager>,
}

impl AppState {
    pub fn new(model_registry: Arc<ModelRegistry>, session_manager: Arc<SessionManager>) -> Self {
        Self {
            array_validator: Arc::new(ArrayValidator::new(model_registry.clone())),
            model_registry,
            session_manager,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ValidateRequest {
    /// One record (object) or an array of records.
    #[schema(value_type = Object)]
    pub payload: JsonValue,
    /// Minimum success rate (percent) for the batch to pass.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// When set, the counts are also accumulated into this batch session
    /// (created on first use).
    #[serde(default)]
    pub batch_id: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateBatchRequest {
    /// Batch id to use; generated when omitted.
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateBatchRequest {
    #[serde(default)]
    pub valid: u64,
    #[serde(default)]
    pub invalid: u64,
    #[serde(default)]
    pub warnings: u64,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::err(format!(
            "Invalid JSON body: {} (expected: {})",
            err, expected
        ))),
    )
}
