//! Service entry point: initializes tracing, loads settings, and prepares
//! the database and receipt storage.

use dotenvy::dotenv;
use rab_ledger::{
    config::{database, settings},
    core::receipt::ReceiptStore,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing as early as possible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal, env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    let app_settings = settings::load_default_settings();
    info!(
        database_url = %app_settings.database_url,
        storage_dir = %app_settings.storage_dir,
        "Loaded application settings."
    );

    let db = database::create_connection(&app_settings.database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create database tables: {}", e))?;

    tokio::fs::create_dir_all(&app_settings.storage_dir).await?;
    let _receipt_store =
        ReceiptStore::with_max_bytes(&app_settings.storage_dir, app_settings.max_receipt_bytes);
    info!("Receipt store ready at {}.", app_settings.storage_dir);

    // The service surface (HTTP handlers) mounts on top of the core modules;
    // until it lands, starting up verifies configuration and storage.
    info!("rab-ledger core initialized; shutting down.");

    Ok(())
}
