//! Migrations for the reporting store (sales and seller KPIs).
//!
//! The reporting store lives in its own database file and is rebuilt by
//! the sync endpoints, so it keeps a separate migration history.

use sea_orm_migration::prelude::*;

mod m20260110_000001_create_sales;
mod m20260110_000002_create_seller_kpis;

pub struct ReportingMigrator;

#[async_trait::async_trait]
impl MigratorTrait for ReportingMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_sales::Migration),
            Box::new(m20260110_000002_create_seller_kpis::Migration),
        ]
    }
}
