//! shelf-api - Book record service
//!
//! Serves book CRUD and CSV import over HTTP, storing records in SQLite.
//! Configuration comes from the command line, `SHELF_*` environment
//! variables, a TOML file, then compiled defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_common::config::{ConfigOverrides, ServiceConfig, DEFAULT_LOG_LEVEL};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use shelf_api::{build_router, db, AppState};

/// Command-line arguments for shelf-api
#[derive(Parser, Debug)]
#[command(name = "shelf-api")]
#[command(about = "Book record service with CSV import")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Installed before configuration is read so config loading can log.
    // RUST_LOG wins over every configured level.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let follow_config = env_filter.is_none();
    let startup_level = args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| log_filter(startup_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::resolve(args.overrides(), args.config.as_deref())
        .context("Failed to resolve configuration")?;

    if let Some(level) = configured_level(follow_config, startup_level, &config) {
        filter_handle
            .reload(log_filter(level))
            .context("Failed to apply configured log level")?;
    }

    info!(
        "Starting shelf-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Database: {}", config.database_path.display());
    let pool = db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let app = build_router(AppState::new(pool));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{},tower_http=debug", level))
}

/// Level the startup filter must switch to once configuration is resolved
///
/// `None` when RUST_LOG is in charge or the level did not change.
fn configured_level<'a>(
    follow_config: bool,
    startup_level: &str,
    config: &'a ServiceConfig,
) -> Option<&'a str> {
    (follow_config && config.log_level != startup_level).then_some(config.log_level.as_str())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
