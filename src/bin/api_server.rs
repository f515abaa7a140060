// src/bin/api_server.rs

use record_validation_engine::domain::model::examples::register_examples;
use record_validation_engine::infra::config;
use record_validation_engine::transport;
use record_validation_engine::{ModelRegistry, SessionManager};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    // --- Model Registry Initialization ---
    let model_registry = Arc::new(ModelRegistry::new());
    register_examples(&model_registry).await?;
    let model_ids = model_registry.list_ids().await;
    tracing::info!(models = ?model_ids, "model registry initialized");

    // --- Session Manager Initialization ---
    let retention = config::session_retention();
    let sweep_interval = config::session_sweep_interval();
    let session_manager = Arc::new(SessionManager::with_timing(retention, sweep_interval));
    let sweeper = session_manager.clone().start_expiry_sweeper();
    tracing::info!(
        retention_secs = retention.as_secs(),
        sweep_interval_secs = sweep_interval.as_secs(),
        "session expiry sweeper started"
    );

    // --- API Server Initialization ---
    let app_state = transport::http::AppState::new(model_registry, session_manager.clone());
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    session_manager.shutdown();
    if let Err(e) = sweeper.await {
        tracing::warn!("session sweeper ended abnormally: {}", e);
    }
    tracing::info!("graceful shutdown complete");

    Ok(())
}
