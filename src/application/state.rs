use crate::config::import::ImportConfig;
use crate::config::storage::StorageConfig;
use crate::db::DbConn;
use crate::services::notification::NotificationService;
use crate::services::write_queue::WriteQueue;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    /// Operational store: users, tasks, notifications, agenda
    pub db: DbConn,
    /// Reporting store: sales and seller KPIs
    pub reporting_db: DbConn,
    pub notification: NotificationService,
    pub write_queue: WriteQueue,
    pub storage: StorageConfig,
    pub import: ImportConfig,
}

impl AppState {
    pub fn new(
        db: DbConn,
        reporting_db: DbConn,
        write_queue: WriteQueue,
        storage: StorageConfig,
        import: ImportConfig,
    ) -> Self {
        Self {
            notification: NotificationService::new(db.clone()),
            db,
            reporting_db,
            write_queue,
            storage,
            import,
        }
    }
}
