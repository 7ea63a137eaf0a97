//! Vitalog API Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from `config.toml` (or `~/.config/vitalog/config.toml`), with
//! environment variable overrides:
//! - `VITALOG_DB_PATH`: SQLite database file
//! - `VITALOG_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `VITALOG_API_PORT`: Port to listen on (default: 8080)
//! - `VITALOG_LOG_LEVEL` / `VITALOG_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitalog::api::{serve, ApiConfig, AppState};
use vitalog::config::{generate_default_config, Config};
use vitalog::store::{EventStore, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "vitalog", version, about = "Biometric event store and insight engine")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config);

    tracing::info!("Starting Vitalog API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.storage.db_path);

    let store_config = StoreConfig {
        db_path: PathBuf::from(&config.storage.db_path),
        op_timeout_ms: config.storage.op_timeout_ms,
    };
    let store = Arc::new(EventStore::open(&store_config)?);
    tracing::info!("Event store opened");

    let mut api_config = ApiConfig::new(config.api.host.clone(), config.api.port);
    api_config.max_body_size = config.api.max_body_size;

    let state = AppState::new(store, api_config.clone());
    serve(state, &api_config).await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "vitalog={},tower_http=warn",
            config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
