//! Migration: Create finance_entries table
//!
//! One row per payable or receivable title. Installments and recurring
//! series share a `group_id`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FinanceEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinanceEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinanceEntries::Supplier).string().not_null())
                    .col(
                        ColumnDef::new(FinanceEntries::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FinanceEntries::Category)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FinanceEntries::Unit)
                            .string()
                            .not_null()
                            .default("Matriz"),
                    )
                    .col(
                        ColumnDef::new(FinanceEntries::Payer)
                            .string()
                            .not_null()
                            .default("Matriz"),
                    )
                    .col(ColumnDef::new(FinanceEntries::Value).double().not_null())
                    .col(ColumnDef::new(FinanceEntries::IssueDate).string().not_null())
                    .col(ColumnDef::new(FinanceEntries::DueDate).string().not_null())
                    .col(
                        ColumnDef::new(FinanceEntries::Status)
                            .string()
                            .not_null()
                            .default("PENDENTE"),
                    )
                    .col(
                        ColumnDef::new(FinanceEntries::Kind)
                            .string()
                            .not_null()
                            .default("EXPENSE"),
                    )
                    .col(
                        ColumnDef::new(FinanceEntries::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FinanceEntries::TotalInstallments)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(FinanceEntries::CurrentInstallment)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(FinanceEntries::GroupId).string().not_null())
                    .col(
                        ColumnDef::new(FinanceEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_finance_entries_kind_due")
                    .table(FinanceEntries::Table)
                    .col(FinanceEntries::Kind)
                    .col(FinanceEntries::DueDate)
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
                    .table(FinanceEntries::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "finance_entries"]
enum FinanceEntries {
    Table,
    Id,
    Supplier,
    Description,
    Category,
    Unit,
    Payer,
    Value,
    #[iden = "issue_date"]
    IssueDate,
    #[iden = "due_date"]
    DueDate,
    Status,
    Kind,
    #[iden = "is_recurring"]
    IsRecurring,
    #[iden = "total_installments"]
    TotalInstallments,
    #[iden = "current_installment"]
    CurrentInstallment,
    #[iden = "group_id"]
    GroupId,
    #[iden = "created_at"]
    CreatedAt,
}
