/// HTTP server setup and routing
use crate::{
    api::middleware::{track_requests, track_visitors},
    context::AppContext,
    error::{GateError, GateResult},
    metrics,
};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use std::{net::SocketAddr, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(describe_service))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(crate::api::routes(ctx.clone()))
        .with_state(ctx.clone())
        .layer(middleware::from_fn_with_state(ctx, track_visitors))
        .layer(middleware::from_fn(track_requests))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Service description handler
async fn describe_service(
    axum::extract::State(ctx): axum::extract::State<AppContext>,
) -> Json<serde_json::Value> {
    Json(json!({
        "service": "study-gate",
        "version": ctx.config.service.version,
    }))
}

/// Prometheus exposition
async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "NotFound",
            "message": "Endpoint not found"
        })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> GateResult<()> {
    let addr = format!("{}:{}", ctx.config.service.hostname, ctx.config.service.port);

    info!("Study Gate listening on {}", addr);
    info!("   Service URL: {}", ctx.service_url());

    spawn_limiter_cleanup(ctx.clone());
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GateError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| GateError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Periodically forget login-throttle state for idle clients
fn spawn_limiter_cleanup(ctx: AppContext) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            ctx.login_limiter.retain_recent();
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
