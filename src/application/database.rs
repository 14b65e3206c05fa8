use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::migrations::reporting::ReportingMigrator;
use crate::migrations::Migrator;

pub type DbConn = DatabaseConnection;

/// Connect to the operational database and run its migrations
pub async fn connect() -> Result<DbConn> {
    connect_with_url(&CONFIG.database.database_url).await
}

/// Connect to the reporting database and run its migrations
pub async fn connect_reporting() -> Result<DbConn> {
    connect_reporting_with_url(&CONFIG.database.reporting_database_url).await
}

/// Create a new operational connection with a specific URL and run migrations
pub async fn connect_with_url(database_url: &str) -> Result<DbConn> {
    tracing::info!("Connecting to operational database...");
    let db = open(database_url).await?;

    tracing::info!("Running database migrations...");
    Migrator::up(&db, None)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Database migrations completed");

    Ok(db)
}

/// Create a new reporting connection with a specific URL and run migrations
pub async fn connect_reporting_with_url(database_url: &str) -> Result<DbConn> {
    tracing::info!("Connecting to reporting database...");
    let db = open(database_url).await?;

    ReportingMigrator::up(&db, None)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run reporting migrations: {}", e)))?;
    tracing::info!("Reporting migrations completed");

    Ok(db)
}

async fn open(database_url: &str) -> Result<DbConn> {
    ensure_parent_dir(database_url)?;

    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    // Every in-memory connection is a separate database
    if database_url.contains(":memory:") {
        opts.max_connections(1);
    }

    Database::connect(opts)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// SQLite creates the file with `mode=rwc` but not its directory
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(database_url) else {
        return Ok(());
    };
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// File path of a `sqlite://` URL, `None` for in-memory or other backends
fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}
