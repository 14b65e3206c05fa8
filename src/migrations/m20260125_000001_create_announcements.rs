//! Migration: Create announcements and dept_messages tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Announcements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Announcements::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Announcements::Title).string().not_null())
                    .col(ColumnDef::new(Announcements::Content).text().not_null())
                    .col(ColumnDef::new(Announcements::Author).string().not_null())
                    .col(
                        ColumnDef::new(Announcements::Priority)
                            .string()
                            .not_null()
                            .default("Normal"),
                    )
                    .col(
                        ColumnDef::new(Announcements::Category)
                            .string()
                            .not_null()
                            .default("Aviso"),
                    )
                    .col(
                        ColumnDef::new(Announcements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeptMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeptMessages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeptMessages::Department).string().not_null())
                    .col(ColumnDef::new(DeptMessages::Author).string().not_null())
                    .col(ColumnDef::new(DeptMessages::Content).text().not_null())
                    .col(
                        ColumnDef::new(DeptMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dept_messages_department")
                    .table(DeptMessages::Table)
                    .col(DeptMessages::Department)
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
                    .table(DeptMessages::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table(Announcements::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "announcements"]
enum Announcements {
    Table,
    Id,
    Title,
    Content,
    Author,
    Priority,
    Category,
    #[iden = "created_at"]
    CreatedAt,
}

#[derive(Iden)]
#[iden = "dept_messages"]
enum DeptMessages {
    Table,
    Id,
    Department,
    Author,
    Content,
    #[iden = "created_at"]
    CreatedAt,
}
