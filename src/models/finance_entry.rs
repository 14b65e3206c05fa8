use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "PENDENTE";
pub const STATUS_PAID: &str = "PAGO";

pub const KIND_EXPENSE: &str = "EXPENSE";
pub const KIND_INCOME: &str = "INCOME";

/// A payable or receivable title
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "finance_entries")]
#[serde(rename_all = "camelCase")]
#[schema(as = FinanceEntry)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub supplier: String,
    pub description: String,
    pub category: String,
    /// Store the title belongs to
    pub unit: String,
    /// Company paying or receiving
    pub payer: String,
    pub value: f64,
    /// `YYYY-MM-DD`
    pub issue_date: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    pub status: String,
    /// `EXPENSE` or `INCOME`
    #[serde(rename = "type")]
    pub kind: String,
    pub is_recurring: bool,
    pub total_installments: i32,
    pub current_installment: i32,
    /// Shared by every installment generated from one request
    pub group_id: String,
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
