//! commitment-advisor HTTP Server
//!
//! Axum-based server exposing the advisor tools as a JSON API.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commitment_advisor::Advisor;
use commitment_advisor::source::{
    CoinGeckoClient, HttpLedgerClient, LedgerDataSource, MarketDataSource, MockLedger, MockMarketData,
};

use crate::handlers::{execute_tool, health_check, list_tools, message_handler};
use crate::state::AppState;

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(execute_tool))
        .route("/api/message", post(message_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Data sources selected by `MARKET_DATA` (`coingecko` or `mock`)
fn build_advisor() -> anyhow::Result<Advisor> {
    let mode = std::env::var("MARKET_DATA").unwrap_or_else(|_| "coingecko".into());

    let (market, ledger): (Arc<dyn MarketDataSource>, Arc<dyn LedgerDataSource>) =
        if mode.eq_ignore_ascii_case("mock") {
            (Arc::new(MockMarketData::new()), Arc::new(MockLedger::new()))
        } else {
            (Arc::new(CoinGeckoClient::from_env()?), Arc::new(HttpLedgerClient::from_env()?))
        };

    tracing::info!(market = market.name(), ledger = ledger.name(), "data sources ready");
    Ok(Advisor::new(market).with_ledger(ledger))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new(build_advisor()?)?;

    tracing::info!("Registered {} tools:", state.tools.len());
    for name in state.tools.names() {
        tracing::info!("  • {}", name);
    }

    let app = build_router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("commitment-advisor server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  GET  /api/tools         - List tool schemas");
    tracing::info!("  POST /api/tools/{{name}}  - Execute a tool");
    tracing::info!("  POST /api/message       - Analyze a free-text message");

    axum::serve(listener, app).await?;

    Ok(())
}
