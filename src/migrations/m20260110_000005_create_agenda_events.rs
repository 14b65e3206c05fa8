//! Migration: Create agenda_events table

use sea_orm_migration::prelude::*;

use super::m20260110_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AgendaEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AgendaEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AgendaEvents::UserId).string().not_null())
                    .col(ColumnDef::new(AgendaEvents::Title).string().not_null())
                    .col(ColumnDef::new(AgendaEvents::Date).string().not_null())
                    .col(
                        ColumnDef::new(AgendaEvents::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AgendaEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AgendaEvents::Table, AgendaEvents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agenda_events_user_date")
                    .table(AgendaEvents::Table)
                    .col(AgendaEvents::UserId)
                    .col(AgendaEvents::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(AgendaEvents::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "agenda_events"]
enum AgendaEvents {
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    Title,
    Date,
    Completed,
    #[iden = "created_at"]
    CreatedAt,
}
