//! Sales and seller-KPI reporting
//!
//! Batches pushed by the sales extractor are written through the write
//! queue; reads are scoped by the caller's store access.

pub mod stores;

use std::collections::BTreeSet;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::models::{sale, seller_kpi, user};
use crate::services::write_queue::WriteQueue;

pub use stores::StoreAccess;

/// Rows per INSERT, keeping well under SQLite's bound-parameter limit
const INSERT_CHUNK: usize = 100;

// ============================================================================
// Incoming batches
// ============================================================================

/// Sales row as sent by the extractor
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct SaleRecord {
    #[serde(default)]
    pub data_emissao: Option<String>,
    #[serde(default)]
    pub nome_vendedor: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantidade: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_liquido: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cnpj_empresa: Option<String>,
    #[serde(default)]
    pub familia: Option<String>,
    #[serde(default)]
    pub regiao: Option<String>,
}

impl SaleRecord {
    fn into_active_model(self) -> sale::ActiveModel {
        sale::ActiveModel {
            issued_on: Set(normalize_sale_date(self.data_emissao)),
            seller_name: Set(self.nome_vendedor),
            description: Set(self.descricao),
            quantity: Set(self.quantidade),
            net_total: Set(self.total_liquido),
            company_cnpj: Set(self
                .cnpj_empresa
                .map(|c| stores::cnpj_digits(&c))
                .filter(|c| !c.is_empty())),
            family: Set(self.familia),
            region: Set(self.regiao),
            ..Default::default()
        }
    }
}

/// Seller KPI row as sent by the extractor
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct SellerKpiRecord {
    #[serde(default)]
    pub loja: Option<String>,
    #[serde(default)]
    pub vendedor: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat_atual: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub tendencia: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat_anterior: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub crescimento: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub seguros: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pa: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub qtd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ticket: Option<f64>,
    #[serde(default)]
    pub regiao: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pct_seguro: Option<f64>,
}

impl SellerKpiRecord {
    fn into_active_model(self) -> seller_kpi::ActiveModel {
        seller_kpi::ActiveModel {
            store: Set(self.loja),
            seller: Set(self.vendedor),
            current_revenue: Set(self.fat_atual),
            trend: Set(self.tendencia),
            previous_revenue: Set(self.fat_anterior),
            growth: Set(self.crescimento),
            insurance: Set(self.seguros),
            items_per_sale: Set(self.pa),
            quantity: Set(self.qtd),
            ticket: Set(self.ticket),
            region: Set(self.regiao),
            insurance_pct: Set(self.pct_seguro),
            ..Default::default()
        }
    }
}

/// Numbers arrive as JSON numbers or as text, sometimes with a decimal comma
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_decimal(&s),
        _ => None,
    })
}

/// CNPJs sometimes arrive as JSON numbers
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(v) = raw.parse() {
        return Some(v);
    }
    // 1.234,56
    raw.replace('.', "").replace(',', ".").parse().ok()
}

/// `DD/MM/YYYY` becomes `YYYY-MM-DD`; anything else is kept
pub fn normalize_sale_date(raw: Option<String>) -> Option<String> {
    let raw = raw?.trim().to_string();
    if raw.is_empty() {
        return None;
    }
    if raw.contains('/') {
        if let [day, month, year] = raw.split('/').collect::<Vec<_>>().as_slice() {
            return Some(format!("{}-{:0>2}-{:0>2}", year, month, day));
        }
    }
    Some(raw)
}

// ============================================================================
// Sync (write queue)
// ============================================================================

/// Store a sales batch, replacing the table first when `reset` is set
pub async fn sync_sales(
    queue: &WriteQueue,
    db: DatabaseConnection,
    records: Vec<SaleRecord>,
    reset: bool,
) -> Result<usize> {
    tracing::info!(rows = records.len(), reset, "Receiving sales batch");

    queue
        .submit("sync-sales", move || async move {
            let total = records.len();
            let txn = db.begin().await?;

            if reset {
                sale::Entity::delete_many().exec(&txn).await?;
            }

            let mut models = records.into_iter().map(SaleRecord::into_active_model).peekable();
            while models.peek().is_some() {
                let chunk: Vec<sale::ActiveModel> = models.by_ref().take(INSERT_CHUNK).collect();
                sale::Entity::insert_many(chunk).exec(&txn).await?;
            }

            txn.commit().await?;
            tracing::info!(rows = total, reset, "Sales batch stored");
            Ok(total)
        })
        .await
}

/// Replace the seller KPI table
pub async fn sync_seller_kpis(
    queue: &WriteQueue,
    db: DatabaseConnection,
    records: Vec<SellerKpiRecord>,
) -> Result<usize> {
    tracing::info!(rows = records.len(), "Receiving seller KPI batch");

    queue
        .submit("sync-seller-kpis", move || async move {
            let total = records.len();
            let txn = db.begin().await?;

            seller_kpi::Entity::delete_many().exec(&txn).await?;

            let mut models = records
                .into_iter()
                .map(SellerKpiRecord::into_active_model)
                .peekable();
            while models.peek().is_some() {
                let chunk: Vec<seller_kpi::ActiveModel> =
                    models.by_ref().take(INSERT_CHUNK).collect();
                seller_kpi::Entity::insert_many(chunk).exec(&txn).await?;
            }

            txn.commit().await?;
            tracing::info!(rows = total, "Seller KPIs stored");
            Ok(total)
        })
        .await
}

// ============================================================================
// Queries
// ============================================================================

/// Inclusive `YYYY-MM-DD` bounds; applied only when both ends are present
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesQuery {
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SalesResponse {
    pub sales: Vec<sale::Model>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct SalesSummary {
    #[serde(rename = "total_vendas")]
    pub total_sales: f64,
    #[serde(rename = "total_pecas")]
    pub total_items: f64,
    #[serde(rename = "ticket_medio")]
    pub average_ticket: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ChartPoint {
    /// `DD/MM`
    #[serde(rename = "dia")]
    pub day: String,
    #[serde(rename = "dateIso")]
    pub date_iso: String,
    #[serde(rename = "valor")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct RankingEntry {
    #[serde(rename = "nome")]
    pub seller: String,
    #[serde(rename = "loja")]
    pub store: Option<String>,
    pub total: f64,
    #[serde(rename = "qtd")]
    pub quantity: f64,
}

/// Store access of the user id sent by the client
pub async fn access_for(db: &DatabaseConnection, user_id: Option<&str>) -> Result<StoreAccess> {
    let Some(user_id) = user_id
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != "undefined" && *id != "null")
    else {
        tracing::warn!("Reporting request without a user id");
        return Ok(StoreAccess::Nothing);
    };

    let found = user::Entity::find_by_id(user_id.to_string()).one(db).await?;
    let access = StoreAccess::for_user(found.as_ref());
    tracing::debug!(user_id = %user_id, ?access, "Resolved store access");
    Ok(access)
}

/// Sales visible under `access` within the date range; `None` when nothing is
fn scoped_sales(access: &StoreAccess, query: &SalesQuery) -> Option<Select<sale::Entity>> {
    let mut select = sale::Entity::find().filter(access.sales_condition()?);

    if let (Some(start), Some(end)) = (
        query.start_date.as_deref().filter(|s| !s.is_empty()),
        query.end_date.as_deref().filter(|s| !s.is_empty()),
    ) {
        select = select
            .filter(sale::Column::IssuedOn.gte(start))
            .filter(sale::Column::IssuedOn.lte(end));
    }

    Some(select)
}

pub async fn list_sales(
    reporting: &DatabaseConnection,
    access: &StoreAccess,
    query: &SalesQuery,
) -> Result<Vec<sale::Model>> {
    let Some(select) = scoped_sales(access, query) else {
        return Ok(Vec::new());
    };

    Ok(select
        .order_by_asc(sale::Column::IssuedOn)
        .order_by_asc(sale::Column::Id)
        .all(reporting)
        .await?)
}

#[derive(Debug, FromQueryResult)]
struct Totals {
    total_sales: Option<f64>,
    total_items: Option<f64>,
}

pub async fn summary(
    reporting: &DatabaseConnection,
    access: &StoreAccess,
    query: &SalesQuery,
) -> Result<SalesSummary> {
    let Some(select) = scoped_sales(access, query) else {
        return Ok(SalesSummary::default());
    };

    let totals = select
        .select_only()
        .column_as(sale::Column::NetTotal.sum(), "total_sales")
        .column_as(sale::Column::Quantity.sum(), "total_items")
        .into_model::<Totals>()
        .one(reporting)
        .await?;

    let total_sales = totals.as_ref().and_then(|t| t.total_sales).unwrap_or(0.0);
    let total_items = totals.as_ref().and_then(|t| t.total_items).unwrap_or(0.0);
    let average_ticket = if total_sales != 0.0 && total_items != 0.0 {
        total_sales / total_items
    } else {
        0.0
    };

    Ok(SalesSummary {
        total_sales,
        total_items,
        average_ticket,
    })
}

#[derive(Debug, FromQueryResult)]
struct DailyTotal {
    issued_on: Option<String>,
    total: Option<f64>,
}

pub async fn daily_chart(
    reporting: &DatabaseConnection,
    access: &StoreAccess,
    query: &SalesQuery,
) -> Result<Vec<ChartPoint>> {
    let Some(select) = scoped_sales(access, query) else {
        return Ok(Vec::new());
    };

    let rows = select
        .select_only()
        .column(sale::Column::IssuedOn)
        .column_as(sale::Column::NetTotal.sum(), "total")
        .filter(sale::Column::IssuedOn.is_not_null())
        .group_by(sale::Column::IssuedOn)
        .order_by_asc(sale::Column::IssuedOn)
        .into_model::<DailyTotal>()
        .all(reporting)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let date_iso = row.issued_on?;
            let day = match date_iso.split('-').collect::<Vec<_>>().as_slice() {
                [_, month, day] => format!("{}/{}", day, month),
                _ => date_iso.clone(),
            };
            Some(ChartPoint {
                day,
                date_iso,
                value: row.total.unwrap_or(0.0),
            })
        })
        .collect())
}

#[derive(Debug, FromQueryResult)]
struct SellerTotal {
    seller_name: Option<String>,
    company_cnpj: Option<String>,
    total: Option<f64>,
    quantity: Option<f64>,
}

pub async fn ranking(
    reporting: &DatabaseConnection,
    access: &StoreAccess,
    query: &SalesQuery,
) -> Result<Vec<RankingEntry>> {
    let Some(select) = scoped_sales(access, query) else {
        return Ok(Vec::new());
    };

    let rows = select
        .select_only()
        .column(sale::Column::SellerName)
        .column_as(sale::Column::CompanyCnpj.max(), "company_cnpj")
        .column_as(sale::Column::NetTotal.sum(), "total")
        .column_as(sale::Column::Quantity.sum(), "quantity")
        .filter(sale::Column::SellerName.is_not_null())
        .group_by(sale::Column::SellerName)
        .into_model::<SellerTotal>()
        .all(reporting)
        .await?;

    let mut entries: Vec<RankingEntry> = rows
        .into_iter()
        .filter_map(|row| {
            Some(RankingEntry {
                seller: row.seller_name?,
                store: row
                    .company_cnpj
                    .as_deref()
                    .and_then(stores::store_for_cnpj)
                    .map(str::to_string),
                total: row.total.unwrap_or(0.0),
                quantity: row.quantity.unwrap_or(0.0),
            })
        })
        .collect();
    entries.sort_by(|a, b| b.total.total_cmp(&a.total));

    Ok(entries)
}

/// KPI rows visible under `access`, highest current revenue first
pub async fn seller_kpis(
    reporting: &DatabaseConnection,
    access: &StoreAccess,
) -> Result<Vec<seller_kpi::Model>> {
    if *access == StoreAccess::Nothing {
        return Ok(Vec::new());
    }

    let rows = seller_kpi::Entity::find()
        .order_by_desc(seller_kpi::Column::CurrentRevenue)
        .order_by_asc(seller_kpi::Column::Id)
        .all(reporting)
        .await?;

    Ok(rows
        .into_iter()
        .filter(|row| access.allows_store(row.store.as_deref()))
        .collect())
}

/// Store names present in sales data, or the whole directory when none match
pub async fn external_stores(reporting: &DatabaseConnection) -> Result<Vec<String>> {
    let cnpjs: Vec<Option<String>> = sale::Entity::find()
        .select_only()
        .column(sale::Column::CompanyCnpj)
        .distinct()
        .filter(sale::Column::CompanyCnpj.is_not_null())
        .into_tuple::<Option<String>>()
        .all(reporting)
        .await?;

    let names: BTreeSet<String> = cnpjs
        .iter()
        .flatten()
        .filter_map(|cnpj| stores::store_for_cnpj(cnpj))
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Ok(stores::directory_names());
    }
    Ok(names.into_iter().collect())
}
