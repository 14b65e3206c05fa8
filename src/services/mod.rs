pub mod agenda;
pub mod announcements;
pub mod finance;
pub mod import;
pub mod notification;
pub mod reporting;
pub mod security;
pub mod stats;
pub mod task_flow;
pub mod tasks;
pub mod uploads;
pub mod users;
pub mod write_queue;

pub use notification::NotificationService;
pub use write_queue::WriteQueue;
