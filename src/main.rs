mod models;
mod handlers;
mod routes;
mod docs;
mod config;
mod services;
mod state;
mod websocket;

use config::Config;
use routes::create_app;
use services::session_store::spawn_retention_sweeper;
use state::AppState;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use std::panic;

#[tokio::main]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "colabri_code=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    if config.is_production() && config.cors_origin_list().is_none() {
        warn!("CORS_ORIGINS not set in production - accepting requests from any origin");
    }
    info!("Environment: {}", config.environment);

    let address = config.server_address();
    let state = AppState::new(config);

    // Sessions live for the process lifetime unless an idle TTL is configured
    match state.config.session_idle_ttl() {
        Some(ttl) => {
            spawn_retention_sweeper(state.store.clone(), ttl, state.config.session_sweep_interval());
        }
        None if state.config.is_development() => {
            info!("Session retention disabled");
        }
        None => {
            warn!("Session retention disabled - sessions accumulate until restart");
        }
    }

    let app_routes = create_app(state);

    // Start the HTTP/API server
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", address));

    info!("🚀 Server running on http://{}", address);
    info!("📡 WebSocket available at ws://{}/ws", address);
    info!("📚 Swagger UI available at http://{}/swagger", address);

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}
