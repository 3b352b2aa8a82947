use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bahn_server::cache::ResponseCache;
use bahn_server::config::AppConfig;
use bahn_server::snapshot::{NetworkSnapshot, spawn_builder};
use bahn_server::store::MySqlStore;
use bahn_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "bahn_server=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let store = match MySqlStore::connect(&config.database).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    // Stations and the connection graph load in the background; requests
    // arriving before then see them as absent.
    let snapshot = NetworkSnapshot::new();
    spawn_builder(Arc::clone(&store), snapshot.clone(), config.build);

    let state = AppState::new(
        store,
        snapshot,
        config.build.window,
        ResponseCache::new(&config.cache),
    );
    state.spawn_cache_invalidation();
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %config.bind, "listening");
    info!("  GET /health");
    info!("  GET /bahn/v1/stations, /station, /statistics");
    info!("  GET /bahn/v1/journey, /journey/dates");
    info!("  GET /bahn/v1/station/journeys, /station/connections, /connections");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
