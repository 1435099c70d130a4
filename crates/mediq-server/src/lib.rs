//! Mediq Server - Diagnostic Pipeline HTTP Backend
//!
//! A thin axum adapter on top of mediq-core, providing:
//! - RESTful HTTP API for symptom analysis
//! - Health probe endpoint for deployment checks
//! - CORS and request tracing for browser frontends
//!
//! This crate can be used standalone or embedded in other applications
//! (e.g. the `mediq serve` CLI command).

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use mediq_core::{DiagnosticService, HealthStatus};

/// Shared handler state: the diagnostic service facade.
pub type AppState = Arc<DiagnosticService>;

/// Configuration for the Mediq backend server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Build the complete router: API routes, service info, and health probe.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router())
        .route("/", axum::routing::get(service_info))
        .route("/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the embedded Mediq backend server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: ServerConfig,
    service: Arc<DiagnosticService>,
) -> Result<SocketAddr, String> {
    // Initialize tracing (no-op when the caller already installed a subscriber)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediq_server=info,tower_http=info".into()),
        )
        .try_init();

    tracing::info!(
        "Starting Mediq backend server on {}:{}",
        config.host,
        config.port
    );

    let app = app_router(service);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("Mediq backend server listening on {}", local_addr);

    // Spawn the server in a background task
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

async fn service_info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "service": "Mediq Diagnostic API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "analyze": "POST /api/analyze",
            "health": "GET /health",
        },
    }))
}

/// Readiness probe. Reports unhealthy (still HTTP 200) when the prompt
/// catalog is missing any required role or task definition.
async fn health_check(State(state): State<AppState>) -> axum::Json<HealthStatus> {
    axum::Json(state.health_check())
}
