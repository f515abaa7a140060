use crate::domain::validation::array::records_of;
use crate::transport::http::handlers::common::{
    check_threshold, engine_error_response, ok_response,
};
use crate::transport::http::types::{json_422, AppState, ValidateRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
struct ModelInfo {
    id: String,
    display_name: String,
    description: Option<String>,
    has_validator: bool,
    instance: serde_json::Value,
}

#[utoipa::path(
    get,
    path = "/api/models",
    responses(
        (status = 200, description = "Registered models", body = ApiResponse)
    )
)]
pub async fn list_models_handler(State(state): State<AppState>) -> impl IntoResponse {
    let models: Vec<ModelInfo> = state
        .model_registry
        .get_all()
        .await
        .into_iter()
        .map(|d| ModelInfo {
            instance: d.shape.create_instance(),
            has_validator: d.validator.is_some(),
            id: d.id,
            display_name: d.display_name,
            description: d.description,
        })
        .collect();
    ok_response(&models)
}

#[utoipa::path(
    post,
    path = "/api/models/{model}/validate",
    params(
        ("model" = String, Path, description = "Model id (e.g. incident)")
    ),
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Validation result (status may be failed)", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 404, description = "Model not registered", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn validate_handler(
    State(state): State<AppState>,
    Path(model): Path<String>,
    request: Result<Json<ValidateRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Model ids are case-sensitive, as registered.
    let model_id = model.trim().to_string();

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"payload\": {...} | [...], \"threshold\"?: number}")
                .into_response()
        }
    };
    if let Err(resp) = check_threshold(request.threshold) {
        return resp;
    }

    let result = match request.batch_id.as_deref().map(str::trim) {
        Some(batch_id) if !batch_id.is_empty() => {
            state
                .array_validator
                .validate_into_session(
                    &state.session_manager,
                    batch_id,
                    &model_id,
                    records_of(&request.payload),
                    request.threshold,
                )
                .await
        }
        _ => {
            state
                .array_validator
                .validate_payload(&model_id, &request.payload, request.threshold)
                .await
        }
    };

    match result {
        Ok(r) => ok_response(&r),
        Err(e) => engine_error_response(e),
    }
}
