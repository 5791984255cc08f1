//! Bankly Server - Main entry point.

use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bankly_api::AppState;
use bankly_auth::JwtCodec;
use bankly_model::{Argon2Hasher, UserStore};
use bankly_storage_sqlite::SqliteBackend;

#[derive(Parser)]
#[command(name = "bankly-server")]
#[command(about = "Bankly - banking demo backend")]
#[command(version)]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:3000", env = "BANKLY_BIND_ADDRESS")]
    bind: String,

    /// Directory where the database file is stored
    #[arg(long, default_value = "data", env = "BANKLY_DATA_DIR")]
    data_dir: String,

    /// Shared secret for signing and verifying tokens
    #[arg(long, default_value = "development-secret-key", env = "SECRET_KEY")]
    secret: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Bankly server...");
    tracing::info!("Bind address: {}", cli.bind);

    if cli.secret == "development-secret-key" {
        tracing::warn!("Using the development token secret - DO NOT USE IN PRODUCTION");
    }

    let backend = SqliteBackend::open(&cli.data_dir, "bankly").await?;

    let state = AppState {
        users: UserStore::new(Arc::new(backend), Arc::new(Argon2Hasher)),
        tokens: Arc::new(JwtCodec::new(&cli.secret)),
    };

    let app = bankly_api::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!("Bankly server listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}
