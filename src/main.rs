// src/main.rs

use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sweepstake::config::Config;
use sweepstake::routes;
use sweepstake::state::AppState;
use sweepstake::store::seed;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("DATABASE_URL must be a valid SQLite URL")
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    if let Some(parent) = connect_options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).expect("Failed to create database directory");
        }
    }
    std::fs::create_dir_all(&config.qr_code_dir).expect("Failed to create QR code directory");

    // SQLite allows a single writer; a small pool is plenty for one event.
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options)
        .await
        .expect("Failed to open database");

    tracing::info!("Database opened: {}", config.database_url);

    let state = AppState::new(pool, config.clone()).expect("Failed to build application state");

    // Explicit one-time setup: migrations, then seed questions into an empty database.
    seed::setup(&state.pool, &state.catalog)
        .await
        .expect("Failed to set up database");
    tracing::info!("Database ready with {} catalog questions.", state.catalog.len());

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("Guest links point at {}", config.base_url);

    axum::serve(listener, app).await.expect("Server error");
}
