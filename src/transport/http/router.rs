use crate::transport::http::handlers::{batches, health, models};
use crate::transport::http::types::{
    ApiResponse, CreateBatchRequest, UpdateBatchRequest, ValidateRequest,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        models::list_models_handler,
        models::validate_handler,
        batches::create_batch_handler,
        batches::get_batch_handler,
        batches::update_batch_handler,
        batches::finalize_batch_handler,
        batches::delete_batch_handler
    ),
    components(schemas(ApiResponse, ValidateRequest, CreateBatchRequest, UpdateBatchRequest))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/models", get(models::list_models_handler))
        .route("/api/models/:model/validate", post(models::validate_handler))
        .route("/api/batches", post(batches::create_batch_handler))
        .route(
            "/api/batches/:batch_id",
            get(batches::get_batch_handler).delete(batches::delete_batch_handler),
        )
        .route("/api/batches/:batch_id/update", post(batches::update_batch_handler))
        .route(
            "/api/batches/:batch_id/finalize",
            post(batches::finalize_batch_handler),
        )
        .with_state(app_state)
}
