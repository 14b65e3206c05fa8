//! Payable and receivable titles
//!
//! A request creates either a fixed number of installments or a recurring
//! series of monthly titles. Every title generated by one request shares a
//! group id.

use chrono::{Months, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::finance_entry::{self, KIND_EXPENSE, KIND_INCOME, STATUS_PAID, STATUS_PENDING};
use crate::services::reporting::lenient_number;

/// Months generated for a recurring title
pub const RECURRING_MONTHS: u32 = 12;

/// Upper bound for installments in one request
pub const MAX_INSTALLMENTS: u32 = 120;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 500;

#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFinanceTitle {
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub unit: Option<String>,
    pub payer: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    /// `YYYY-MM-DD` or `DD/MM/YYYY`; today when missing
    pub issue_date: Option<String>,
    /// First due date, `YYYY-MM-DD` or `DD/MM/YYYY`
    #[serde(default)]
    pub due_date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub installments: Option<f64>,
    #[serde(default)]
    pub is_recurring: bool,
    /// `EXPENSE` (default) or `INCOME`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTitles {
    pub message: String,
    pub group_id: String,
    pub count: usize,
}

/// One page of titles of a single kind, by due date
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancePage {
    pub data: Vec<finance_entry::Model>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// One title of a generated series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installment {
    pub number: u32,
    pub total: u32,
    pub description: String,
    pub due_date: NaiveDate,
}

/// Accepts `YYYY-MM-DD`, an ISO timestamp or `DD/MM/YYYY`
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%d/%m/%Y"))
        .ok()
}

/// Monthly due dates starting at `first_due`.
///
/// Days past the end of a shorter month move to its last day.
pub fn schedule(
    description: &str,
    first_due: NaiveDate,
    installments: u32,
    recurring: bool,
) -> Result<Vec<Installment>> {
    let total = if recurring {
        RECURRING_MONTHS
    } else {
        installments
    };

    (0..total)
        .map(|i| {
            let due_date = first_due
                .checked_add_months(Months::new(i))
                .ok_or_else(|| AppError::BadRequest("dueDate is out of range".to_string()))?;
            let description = if recurring {
                format!("{} (Recorrente)", description)
            } else {
                format!("{} ({}/{})", description, i + 1, total)
            };
            Ok(Installment {
                number: i + 1,
                total,
                description,
                due_date,
            })
        })
        .collect()
}

fn normalize_kind(kind: Option<&str>) -> Result<String> {
    let kind = kind
        .map(|k| k.trim().to_uppercase())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| KIND_EXPENSE.to_string());
    if kind != KIND_EXPENSE && kind != KIND_INCOME {
        return Err(AppError::BadRequest(format!("Unknown title type: {}", kind)));
    }
    Ok(kind)
}

fn installment_count(raw: Option<f64>) -> Result<u32> {
    let count = raw.map(f64::trunc).unwrap_or(1.0);
    if !(1.0..=MAX_INSTALLMENTS as f64).contains(&count) {
        return Err(AppError::BadRequest(format!(
            "installments must be between 1 and {}",
            MAX_INSTALLMENTS
        )));
    }
    Ok(count as u32)
}

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Generate and store the titles described by `new`
pub async fn create_titles(db: &DatabaseConnection, new: NewFinanceTitle) -> Result<CreatedTitles> {
    let supplier = new.supplier.trim().to_string();
    if supplier.is_empty() {
        return Err(AppError::BadRequest("supplier is required".to_string()));
    }
    let value = new
        .value
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest("value must be a number".to_string()))?;
    let first_due = parse_day(&new.due_date)
        .ok_or_else(|| AppError::BadRequest("dueDate must be a date".to_string()))?;
    let issue_date = match new.issue_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_day(raw)
            .ok_or_else(|| AppError::BadRequest("issueDate must be a date".to_string()))?,
        None => chrono::Utc::now().date_naive(),
    };
    let kind = normalize_kind(new.kind.as_deref())?;
    let count = if new.is_recurring {
        RECURRING_MONTHS
    } else {
        installment_count(new.installments)?
    };

    let series = schedule(new.description.trim(), first_due, count, new.is_recurring)?;
    let group_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now();
    let unit = text_or(new.unit, "Matriz");
    let payer = text_or(new.payer, "Matriz");
    let category = new.category.trim().to_string();

    let rows: Vec<finance_entry::ActiveModel> = series
        .iter()
        .map(|installment| finance_entry::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            supplier: Set(supplier.clone()),
            description: Set(installment.description.clone()),
            category: Set(category.clone()),
            unit: Set(unit.clone()),
            payer: Set(payer.clone()),
            value: Set(value),
            issue_date: Set(issue_date.format("%Y-%m-%d").to_string()),
            due_date: Set(installment.due_date.format("%Y-%m-%d").to_string()),
            status: Set(STATUS_PENDING.to_string()),
            kind: Set(kind.clone()),
            is_recurring: Set(new.is_recurring),
            total_installments: Set(installment.total as i32),
            current_installment: Set(installment.number as i32),
            group_id: Set(group_id.clone()),
            created_at: Set(now),
        })
        .collect();

    let txn = db.begin().await?;
    finance_entry::Entity::insert_many(rows).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        group_id = %group_id,
        count = series.len(),
        recurring = new.is_recurring,
        "Finance titles generated"
    );
    Ok(CreatedTitles {
        message: "Titles generated".to_string(),
        group_id,
        count: series.len(),
    })
}

/// Titles of one kind, paginated by due date
pub async fn list_titles(
    db: &DatabaseConnection,
    kind: Option<&str>,
    page: Option<u64>,
    limit: Option<u64>,
) -> Result<FinancePage> {
    let kind = normalize_kind(kind)?;
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let select = finance_entry::Entity::find().filter(finance_entry::Column::Kind.eq(kind));
    let total = select.clone().count(db).await?;
    let data = select
        .order_by_asc(finance_entry::Column::DueDate)
        .order_by_asc(finance_entry::Column::CurrentInstallment)
        .offset((page - 1) * limit)
        .limit(limit)
        .all(db)
        .await?;

    Ok(FinancePage {
        data,
        total,
        total_pages: total.div_ceil(limit),
        current_page: page,
    })
}

/// Mark a title `PAGO` or `PENDENTE`
pub async fn set_status(
    db: &DatabaseConnection,
    id: &str,
    status: &str,
) -> Result<finance_entry::Model> {
    let status = status.trim().to_uppercase();
    if status != STATUS_PAID && status != STATUS_PENDING {
        return Err(AppError::BadRequest(format!("Unknown status: {}", status)));
    }

    let entry = finance_entry::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Title not found".to_string()))?;

    let mut active: finance_entry::ActiveModel = entry.into();
    active.status = Set(status);
    Ok(active.update(db).await?)
}

pub async fn delete_title(db: &DatabaseConnection, id: &str) -> Result<()> {
    let result = finance_entry::Entity::delete_by_id(id.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Title not found".to_string()));
    }
    tracing::info!(title_id = %id, "Finance title deleted");
    Ok(())
}

/// Remove every title; returns how many were deleted
pub async fn delete_all_titles(db: &DatabaseConnection) -> Result<u64> {
    let result = finance_entry::Entity::delete_many().exec(db).await?;
    tracing::warn!(deleted = result.rows_affected, "All finance titles deleted");
    Ok(result.rows_affected)
}
