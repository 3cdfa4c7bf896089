//! Rustcast Server - Outperformance forecast API
//!
//! Serves `POST /predict` and `GET /health` over HTTP. Market data comes
//! from Yahoo Finance by default; set `PROVIDER=mock` for a deterministic
//! offline provider.
//!
//! # Usage
//! ```sh
//! PORT=8080 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `HOST` / `PORT` - Bind address (default: 0.0.0.0:8080)
//! - `PROVIDER` - Market data provider, 'yahoo' or 'mock' (default: yahoo)
//! - `BENCHMARK_SYMBOL` - Benchmark index ticker (default: ^GSPC)
//! - `LOOKBACK_DAYS` / `HORIZON_DAYS` - Default engine parameters (10 / 5)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustcast::application::prediction_service::PredictionService;
use rustcast::config::{Config, Provider};
use rustcast::domain::ports::MarketDataService;
use rustcast::infrastructure::mock::MockMarketDataService;
use rustcast::infrastructure::yahoo::YahooFinanceClient;
use rustcast::interfaces::api::{self, AppState};
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Rustcast Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Provider={:?}, Benchmark={}, Lookback={}, Horizon={}",
        config.provider, config.benchmark_symbol, config.lookback_days, config.horizon_days
    );

    let market_data: Arc<dyn MarketDataService> = match config.provider {
        Provider::Yahoo => Arc::new(YahooFinanceClient::new(
            config.yahoo_base_url.clone(),
            config.benchmark_symbol.clone(),
            config.http_timeout_secs,
        )),
        Provider::Mock => Arc::new(MockMarketDataService::new()),
    };

    let service = Arc::new(PredictionService::new(
        market_data,
        config.lookback_days,
        config.horizon_days,
    ));
    let app = api::router(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST:PORT configuration")?;
    info!("Listening on {}. Press Ctrl+C to shutdown.", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received. Exiting...");
        })
        .await?;

    Ok(())
}
