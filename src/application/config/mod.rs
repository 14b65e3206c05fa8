pub mod database;
pub mod import;
pub mod server;
pub mod storage;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub storage: storage::StorageConfig,
    pub import: import::ImportConfig,

    // Build info
    pub commit_hash: String,
    pub version: String,

    // Logging
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        // A missing .env file is the normal case in production
        let _ = dotenvy::dotenv();

        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            storage: storage::StorageConfig::from_env(),
            import: import::ImportConfig::from_env(),

            // Build info
            commit_hash: env::var("COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            // Logging
            log_level: env::var("TELEFLUXO_LOG_LEVEL")
                .unwrap_or_else(|_| "telefluxo=debug,tower_http=debug".to_string()),
            log_format: env::var("TELEFLUXO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
