//! REST API for the ledger gateway
//!
//! Thin axum layer over [`TransactionCoordinator`](ledger_orchestrator::TransactionCoordinator):
//! - `POST /invoke`, `POST /query`: chaincode calls
//! - `GET /blocks`, `GET /blocks/:number`, `GET /transactions/:hash`: ledger reads
//! - `GET /health`, `GET /metrics`: operations
//! - CORS middleware and request tracing

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Create and configure the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::prometheus_metrics))
        .route("/invoke", post(routes::chaincode::invoke))
        .route("/query", post(routes::chaincode::query))
        .route("/blocks", get(routes::blocks::chain_info))
        .route("/blocks/:number", get(routes::blocks::block_by_number))
        .route("/transactions/:hash", get(routes::blocks::block_by_hash))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the API server on the specified address
pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
