//! Migration: Create sales table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sales::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sales::IssuedOn).string().null())
                    .col(ColumnDef::new(Sales::SellerName).string().null())
                    .col(ColumnDef::new(Sales::Description).string().null())
                    .col(ColumnDef::new(Sales::Quantity).double().null())
                    .col(ColumnDef::new(Sales::NetTotal).double().null())
                    .col(ColumnDef::new(Sales::CompanyCnpj).string().null())
                    .col(ColumnDef::new(Sales::Family).string().null())
                    .col(ColumnDef::new(Sales::Region).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_issued_on")
                    .table(Sales::Table)
                    .col(Sales::IssuedOn)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_company_cnpj")
                    .table(Sales::Table)
                    .col(Sales::CompanyCnpj)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sales::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    #[iden = "issued_on"]
    IssuedOn,
    #[iden = "seller_name"]
    SellerName,
    Description,
    Quantity,
    #[iden = "net_total"]
    NetTotal,
    #[iden = "company_cnpj"]
    CompanyCnpj,
    Family,
    Region,
}
