use server::config;
use server::lobby::Lobby;
use server::routes;

use axum::{routing::get, Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();
    let settings = config.match_settings();
    tracing::info!(
        initial = ?settings.clock.initial,
        increment = ?settings.clock.increment,
        fairy_promotions = settings.options.fairy_promotions,
        "Match settings loaded"
    );
    let lobby = Lobby::new(settings);

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(routes::play_ws::ws_handler))
        .route("/api/sessions", get(routes::sessions::list_sessions))
        .route("/api/sessions/{session_id}", get(routes::sessions::get_session))
        // Shared state
        .layer(Extension(lobby))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
