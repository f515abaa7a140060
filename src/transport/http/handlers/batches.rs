use crate::domain::validation::array::new_batch_id;
use crate::transport::http::handlers::common::{
    check_threshold, engine_error_response, ok_response,
};
use crate::transport::http::types::{
    json_422, ApiResponse, AppState, CreateBatchRequest, UpdateBatchRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/batches",
    request_body = CreateBatchRequest,
    responses(
        (status = 200, description = "Batch session created", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 409, description = "Batch id already in use", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_batch_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateBatchRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"batch_id\"?: string, \"threshold\"?: number}").into_response()
        }
    };
    if let Err(resp) = check_threshold(request.threshold) {
        return resp;
    }

    let batch_id = request
        .batch_id
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(new_batch_id);

    match state
        .session_manager
        .create_session(&batch_id, request.threshold)
        .await
    {
        Ok(status) => ok_response(&status),
        Err(e) => engine_error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/batches/{batch_id}",
    params(
        ("batch_id" = String, Path, description = "Batch session id")
    ),
    responses(
        (status = 200, description = "Batch session status", body = ApiResponse),
        (status = 404, description = "Unknown batch id", body = ApiResponse)
    )
)]
pub async fn get_batch_handler(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> impl IntoResponse {
    match state.session_manager.get_status(&batch_id).await {
        Ok(status) => ok_response(&status),
        Err(e) => engine_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/batches/{batch_id}/update",
    params(
        ("batch_id" = String, Path, description = "Batch session id")
    ),
    request_body = UpdateBatchRequest,
    responses(
        (status = 200, description = "Counts accumulated", body = ApiResponse),
        (status = 404, description = "Unknown batch id", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn update_batch_handler(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
    request: Result<Json<UpdateBatchRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"valid\": int, \"invalid\": int, \"warnings\": int}")
                .into_response()
        }
    };

    match state
        .session_manager
        .update_session(&batch_id, request.valid, request.invalid, request.warnings)
        .await
    {
        Ok(status) => ok_response(&status),
        Err(e) => engine_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/batches/{batch_id}/finalize",
    params(
        ("batch_id" = String, Path, description = "Batch session id")
    ),
    responses(
        (status = 200, description = "Batch finalized; data.status is success or failed", body = ApiResponse),
        (status = 404, description = "Unknown batch id", body = ApiResponse)
    )
)]
pub async fn finalize_batch_handler(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = state.session_manager.finalize_session(&batch_id).await {
        return engine_error_response(e);
    }
    match state.session_manager.get_status(&batch_id).await {
        Ok(status) => ok_response(&status),
        Err(e) => engine_error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/batches/{batch_id}",
    params(
        ("batch_id" = String, Path, description = "Batch session id")
    ),
    responses(
        (status = 200, description = "Batch session deleted", body = ApiResponse),
        (status = 404, description = "Unknown batch id", body = ApiResponse)
    )
)]
pub async fn delete_batch_handler(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> impl IntoResponse {
    if state.session_manager.delete_session(&batch_id).await {
        (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({ "batch_id": batch_id, "deleted": true }))),
        )
            .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("batch session '{}' not found", batch_id))),
        )
            .into_response()
    }
}
