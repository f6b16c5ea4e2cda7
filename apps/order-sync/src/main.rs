//! Order Sync Binary
//!
//! Runs one MoySklad → PostgreSQL order sync and exits.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-sync
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `MOYSKLAD_LOGIN`: MoySklad account login
//! - `MOYSKLAD_PASSWORD`: MoySklad account password
//!
//! ## Optional
//! - `ORDER_SYNC_CONFIG`: Path to a YAML config file (default: built-in template)
//! - `MOYSKLAD_BASE_URL`: API base URL (default: <https://api.moysklad.ru/api/remap/1.2>)
//! - `MOYSKLAD_TIMEOUT_SECS`: HTTP timeout in seconds (default: none)
//! - `DATABASE_HOST`: PostgreSQL host (default: localhost)
//! - `DATABASE_PORT`: PostgreSQL port (default: 5432)
//! - `DATABASE_NAME`: Database name (default: postgres)
//! - `DATABASE_USER`: Database role (default: postgres)
//! - `DATABASE_PASS`: Database password (default: password)
//! - `DATABASE_CREATE_TABLE`: Create the `orders` table if missing (default: false)
//! - `SYNC_FAIL_ON_STORE_ERROR`: Exit non-zero when the insert fails (default: true)
//! - `LOG_LEVEL`: Log level (default: info)
//! - `LOG_FORMAT`: json | pretty | compact (default: pretty)
//! - `RUST_LOG`: Overrides `LOG_LEVEL` with full filter directives

use std::sync::Arc;

use order_sync::config::{Config, load_config, load_dotenv_from};
use order_sync::infrastructure::moysklad::MoySkladOrderClient;
use order_sync::infrastructure::persistence::PostgresOrderRepository;
use order_sync::observability::init_tracing;
use order_sync::{StoreOutcome, SyncService};

/// Environment variable naming an optional config file.
const CONFIG_PATH_VAR: &str = "ORDER_SYNC_CONFIG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = std::env::current_dir().map(|cwd| load_dotenv_from(&cwd));

    let config_path = std::env::var(CONFIG_PATH_VAR).ok();
    let config = load_config(config_path.as_deref())?;

    init_tracing(&config.observability.logging);

    tracing::info!("Starting order sync");
    match dotenv {
        Ok(Ok(Some(path))) => tracing::info!(path = %path.display(), "Loaded .env file"),
        Ok(Ok(None)) => tracing::debug!("No .env file found"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Failed to load .env file"),
        Err(e) => tracing::warn!(error = %e, "Cannot resolve working directory for .env lookup"),
    }
    log_config(&config, config_path.as_deref());

    let source = Arc::new(MoySkladOrderClient::new(&config.source.to_client_config())?);
    let repository = Arc::new(PostgresOrderRepository::new(config.database.url()?));

    if config.database.create_table {
        repository.create_table().await?;
        tracing::info!("Orders table ensured");
    }

    let report = SyncService::new(source, repository).run().await?;

    match report.store {
        StoreOutcome::Failed(e) if config.sync.fail_on_store_error => {
            tracing::error!(error = %e, fetched = report.fetched, "Order sync failed");
            Err(e.into())
        }
        StoreOutcome::Failed(e) => {
            tracing::warn!(
                error = %e,
                fetched = report.fetched,
                "Order sync finished without storing the batch"
            );
            Ok(())
        }
        StoreOutcome::Stored { rows } => {
            tracing::info!(fetched = report.fetched, rows, "Order sync complete");
            Ok(())
        }
        StoreOutcome::Skipped => {
            tracing::info!("Order sync complete, nothing to store");
            Ok(())
        }
    }
}

/// Log the loaded configuration, without credentials.
fn log_config(config: &Config, path: Option<&str>) {
    tracing::info!(
        config_file = path.unwrap_or("<built-in>"),
        source = %config.source.base_url,
        timeout_secs = ?config.source.timeout_secs,
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.name,
        db_user = %config.database.user,
        fail_on_store_error = config.sync.fail_on_store_error,
        "Configuration loaded"
    );
}
