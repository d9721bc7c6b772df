//! CyberShare server: community blogging platform.
//!
//! Main entry point that loads configuration, prepares the database and
//! hands over to the API crate.

use tracing_subscriber::{EnvFilter, fmt};

use cybershare_core::config::{AppConfig, LogFormat};
use cybershare_core::error::AppError;
use cybershare_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the environment overlay, then `CYBERSHARE__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("CYBERSHARE_ENV").unwrap_or_else(|_| "development".to_string());
    let dir = std::env::var("CYBERSHARE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CyberShare v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let database = DatabasePool::connect(&config.database).await?;
    if config.database.run_migrations {
        cybershare_database::migration::run_migrations(database.pool()).await?;
    } else {
        tracing::info!("Skipping migrations (database.run_migrations = false)");
    }

    // ── Step 2: Serve until shutdown ─────────────────────────────
    let result = cybershare_api::run_server(config, database.pool().clone()).await;
    database.close().await;
    result
}
