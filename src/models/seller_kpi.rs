use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly seller indicators, replaced wholesale on every sync
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "seller_kpis")]
#[schema(as = SellerKpi)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[serde(rename = "loja")]
    pub store: Option<String>,
    #[serde(rename = "vendedor")]
    pub seller: Option<String>,
    #[serde(rename = "fat_atual")]
    pub current_revenue: Option<f64>,
    #[serde(rename = "tendencia")]
    pub trend: Option<f64>,
    #[serde(rename = "fat_anterior")]
    pub previous_revenue: Option<f64>,
    #[serde(rename = "crescimento")]
    pub growth: Option<f64>,
    #[serde(rename = "seguros")]
    pub insurance: Option<f64>,
    #[serde(rename = "pa")]
    pub items_per_sale: Option<f64>,
    #[serde(rename = "qtd")]
    pub quantity: Option<f64>,
    pub ticket: Option<f64>,
    #[serde(rename = "regiao")]
    pub region: Option<String>,
    #[serde(rename = "pct_seguro")]
    pub insurance_pct: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
