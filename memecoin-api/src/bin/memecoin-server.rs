//! MemeCoin API Server Entry Point
//!
//! Standalone HTTP server for the MemeCoin platform.
//!
//! Configuration is loaded from environment variables (via .env file):
//! `MEMECOIN_HOST`, `MEMECOIN_PORT`, `MEMECOIN_STORE_BACKEND`,
//! `MEMECOIN_SLED_PATH`, bridge credentials and rate-limit knobs.

use std::net::SocketAddr;
use std::time::Duration;

use memecoin_api::{create_router, AppState, ServerConfig};
use memecoin_bridge::{BridgeConfig, Bridges};
use memecoin_store::{open_store, StoreConfig};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle rate-limit buckets are swept.
const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    init_logging();

    let config = ServerConfig::from_env();
    let store_config = StoreConfig::from_env();
    let bridge_config = BridgeConfig::from_env();

    let store = open_store(&store_config)?;
    let bridges = Bridges::new(&bridge_config)?;

    if bridges.chain.configured() {
        match bridges.chain.ping().await {
            Ok(()) => info!("Chain RPC node reachable"),
            Err(e) => warn!("Chain RPC node unreachable, mirror calls will degrade: {}", e),
        }
    }

    let state = AppState::new(store, bridges, config.rate_limit_config())
        .with_app_url(config.app_url.clone());

    // Warm the trend table so cold-start feeds rank against something.
    match state.trends.seed().await {
        Ok(count) => info!("Seeded {} trend entries", count),
        Err(e) => warn!("Trend seeding skipped: {}", e),
    }

    memecoin_engine::start_cleanup_task(state.limiter.clone(), LIMITER_SWEEP_INTERVAL);

    let mut app = create_router(state);
    if config.cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    info!(
        backend = ?store_config.backend,
        "MemeCoin API server listening on {}",
        config.bind_address()
    );

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    // ConnectInfo feeds the per-client rate limiter key.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "memecoin_api=debug,memecoin_engine=debug,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
