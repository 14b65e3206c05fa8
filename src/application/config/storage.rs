use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Prefix for attachment links, e.g. `http://10.0.0.5:3000`. Empty keeps links relative.
    pub public_url: String,
    pub max_upload_bytes: usize,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let max_upload_mb: usize = env::var("TELEFLUXO_MAX_UPLOAD_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        Self {
            upload_dir: PathBuf::from(
                env::var("TELEFLUXO_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            public_url: env::var("TELEFLUXO_PUBLIC_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        }
    }
}
