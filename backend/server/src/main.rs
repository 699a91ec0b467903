//! Wishlist gifting API — entry point.
//!
//! Hosts the funding model behind a small Axum REST API: item
//! registration, contribution listing and recording, and the two-phase
//! Zarinpal payment flow. Ledgers are persisted to SQLite; contribution
//! writes are serialized per item.

mod api;
mod config;
mod db;
mod errors;
mod gateway;
mod locks;
mod payments;
mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use gateway::ZarinpalGateway;
use locks::ItemLocks;
use store::{DbIdentityResolver, SqliteLedgerStore};

/// Shared handler state.
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub store: SqliteLedgerStore,
    pub identity: DbIdentityResolver,
    pub gateway: ZarinpalGateway,
    pub locks: ItemLocks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    // HTTP client shared with the gateway.
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let state = Arc::new(AppState {
        pool: pool.clone(),
        store: SqliteLedgerStore::new(pool.clone()),
        identity: DbIdentityResolver::new(pool),
        gateway: ZarinpalGateway::new(client, &config),
        locks: ItemLocks::new(),
        config,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/items", post(api::create_item))
        .route("/items/:id", get(api::get_item))
        .route(
            "/items/:id/contributions",
            get(api::list_contributions).post(api::contribute),
        )
        .route("/payments/request", post(api::payment_request))
        .route("/payments/verify", post(api::payment_verify))
        .route("/payments/callback", get(api::payment_callback))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr = format!("0.0.0.0:{}", state.config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
