use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transit_engine::EngineConfig;

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngineConfig>,
}

/// API routes shared between the server and the router tests.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/calculate", post(routes::calculate))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "transit_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let engine = EngineConfig::from_env();
    tracing::info!(
        "   TLE catalog: {} (fetch on missing: {})",
        engine.catalog_path.display(),
        engine.fetch_on_missing
    );

    let state = AppState {
        engine: Arc::new(engine),
    };

    let api = api_router(state);

    // Static frontend, with index.html fallback so /results resolves
    let static_path = std::path::Path::new("static");
    let app = if static_path.exists() {
        tracing::info!("   Serving UI from {}", static_path.display());
        let serve = ServeDir::new(static_path)
            .not_found_service(ServeFile::new(static_path.join("index.html")));
        api.fallback_service(serve)
    } else {
        tracing::warn!("   No static/ directory - API only");
        api
    };

    let port = std::env::var("TRANSIT_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("Transit gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---- Static handlers ----

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "transit-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
