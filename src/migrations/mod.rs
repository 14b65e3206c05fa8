pub use sea_orm_migration::prelude::*;

mod m20260110_000001_create_users;
mod m20260110_000002_create_tasks;
mod m20260110_000003_create_task_history;
mod m20260110_000004_create_notifications;
mod m20260110_000005_create_agenda_events;
mod m20260120_000001_add_user_allowed_stores;
mod m20260125_000001_create_announcements;
mod m20260125_000002_create_finance_entries;

pub mod reporting;

/// Migrations for the operational store: users, tasks, notifications, agenda,
/// announcements and finance titles
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_users::Migration),
            Box::new(m20260110_000002_create_tasks::Migration),
            Box::new(m20260110_000003_create_task_history::Migration),
            Box::new(m20260110_000004_create_notifications::Migration),
            Box::new(m20260110_000005_create_agenda_events::Migration),
            Box::new(m20260120_000001_add_user_allowed_stores::Migration),
            Box::new(m20260125_000001_create_announcements::Migration),
            Box::new(m20260125_000002_create_finance_entries::Migration),
        ]
    }
}
