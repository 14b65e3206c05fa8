use std::env;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Operational store: users, tasks, history, notifications, agenda
    pub database_url: String,
    /// Sales and seller KPI store, kept in its own SQLite file
    pub reporting_database_url: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("TELEFLUXO_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| "sqlite://data/telefluxo.db?mode=rwc".to_string()),
            reporting_database_url: env::var("TELEFLUXO_REPORTING_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://database/samsung_vendas.db?mode=rwc".to_string()),
        }
    }
}
