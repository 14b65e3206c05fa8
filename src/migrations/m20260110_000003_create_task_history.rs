//! Migration: Create task_history table

use sea_orm_migration::prelude::*;

use super::m20260110_000002_create_tasks::Tasks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaskHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskHistory::TaskId).string().not_null())
                    .col(ColumnDef::new(TaskHistory::User).string().not_null())
                    .col(ColumnDef::new(TaskHistory::Text).string().not_null())
                    .col(
                        ColumnDef::new(TaskHistory::Kind)
                            .string()
                            .not_null()
                            .default("message"),
                    )
                    .col(ColumnDef::new(TaskHistory::Action).string().null())
                    .col(ColumnDef::new(TaskHistory::TargetUser).string().null())
                    .col(ColumnDef::new(TaskHistory::FileUrl).string().null())
                    .col(ColumnDef::new(TaskHistory::FileName).string().null())
                    .col(
                        ColumnDef::new(TaskHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskHistory::Table, TaskHistory::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_task_history_task")
                    .table(TaskHistory::Table)
                    .col(TaskHistory::TaskId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskHistory::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "task_history"]
enum TaskHistory {
    Table,
    Id,
    #[iden = "task_id"]
    TaskId,
    User,
    Text,
    Kind,
    Action,
    #[iden = "target_user"]
    TargetUser,
    #[iden = "file_url"]
    FileUrl,
    #[iden = "file_name"]
    FileName,
    #[iden = "created_at"]
    CreatedAt,
}
