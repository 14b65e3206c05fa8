//! Migration: Create seller_kpis table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SellerKpis::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SellerKpis::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SellerKpis::Store).string().null())
                    .col(ColumnDef::new(SellerKpis::Seller).string().null())
                    .col(ColumnDef::new(SellerKpis::CurrentRevenue).double().null())
                    .col(ColumnDef::new(SellerKpis::Trend).double().null())
                    .col(ColumnDef::new(SellerKpis::PreviousRevenue).double().null())
                    .col(ColumnDef::new(SellerKpis::Growth).double().null())
                    .col(ColumnDef::new(SellerKpis::Insurance).double().null())
                    .col(ColumnDef::new(SellerKpis::ItemsPerSale).double().null())
                    .col(ColumnDef::new(SellerKpis::Quantity).double().null())
                    .col(ColumnDef::new(SellerKpis::Ticket).double().null())
                    .col(ColumnDef::new(SellerKpis::Region).string().null())
                    .col(ColumnDef::new(SellerKpis::InsurancePct).double().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SellerKpis::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "seller_kpis"]
enum SellerKpis {
    Table,
    Id,
    Store,
    Seller,
    #[iden = "current_revenue"]
    CurrentRevenue,
    Trend,
    #[iden = "previous_revenue"]
    PreviousRevenue,
    Growth,
    Insurance,
    #[iden = "items_per_sale"]
    ItemsPerSale,
    Quantity,
    Ticket,
    Region,
    #[iden = "insurance_pct"]
    InsurancePct,
}
