use std::env;

use crate::services::write_queue::DEFAULT_CAPACITY;

#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Responsible assigned to imported rows whose user is unknown
    pub fallback_user: String,
    /// Jobs that may wait in the write queue before submitters block
    pub write_queue_capacity: usize,
}

impl ImportConfig {
    pub fn from_env() -> Self {
        Self {
            fallback_user: env::var("TELEFLUXO_IMPORT_FALLBACK_USER")
                .unwrap_or_else(|_| "Andre".to_string()),
            write_queue_capacity: env::var("TELEFLUXO_WRITE_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }
}
