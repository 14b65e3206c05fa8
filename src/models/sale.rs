//! Sales rows of the reporting store.
//!
//! Serialized with the column names the sales extractor and the BI
//! screens exchange (`data_emissao`, `nome_vendedor`, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "sales")]
#[schema(as = Sale)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ISO date (`YYYY-MM-DD`)
    #[serde(rename = "data_emissao")]
    pub issued_on: Option<String>,
    #[serde(rename = "nome_vendedor")]
    pub seller_name: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "quantidade")]
    pub quantity: Option<f64>,
    #[serde(rename = "total_liquido")]
    pub net_total: Option<f64>,
    #[serde(rename = "cnpj_empresa")]
    pub company_cnpj: Option<String>,
    #[serde(rename = "familia")]
    pub family: Option<String>,
    #[serde(rename = "regiao")]
    pub region: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
