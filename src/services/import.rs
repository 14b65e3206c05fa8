//! Recurring-payment spreadsheet import
//!
//! Each row of a `;`-separated CSV becomes a pending task. The whole file is
//! written in one transaction on the write queue, so an import either lands
//! completely or not at all.

use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::error::{AppError, Result};
use crate::models::task_history::KIND_SYSTEM;
use crate::models::{task, task_history, user};
use crate::services::notification::NotificationService;
use crate::services::security::generate_task_id;
use crate::services::task_flow::TaskStatus;
use crate::services::write_queue::WriteQueue;

pub const IMPORT_AUTHOR: &str = "Sistema Importador";
pub const IMPORT_SOURCE: &str = "Planilha Recorrente";
pub const IMPORT_PRIORITY: &str = "Alta";

/// One spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRow {
    pub title: String,
    pub amount: String,
    pub responsible: Option<String>,
    pub due: Option<String>,
    pub origin: Option<String>,
}

impl PaymentRow {
    pub fn task_title(&self) -> String {
        format!("💰 {} - R$ {}", self.title, self.amount)
    }
}

struct Columns {
    title: Option<usize>,
    amount: Option<usize>,
    responsible: Option<usize>,
    due: Option<usize>,
    origin: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| {
            headers.iter().position(|h| {
                h.trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(name)
            })
        };
        Self {
            title: find("titulo"),
            amount: find("valor"),
            responsible: find("responsavel"),
            due: find("vencimento"),
            origin: find("origem"),
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.responsible.is_none()
            && self.due.is_none()
            && self.origin.is_none()
    }
}

/// Parse the CSV body. Headers are matched case-insensitively.
pub fn parse_payments(bytes: &[u8]) -> Result<Vec<PaymentRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns = Columns::from_headers(reader.headers()?);
    if columns.is_empty() {
        return Err(AppError::BadRequest(
            "The file is empty or not in the expected format".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        rows.push(PaymentRow {
            title: field(columns.title).unwrap_or_else(|| "Pagamento".to_string()),
            amount: field(columns.amount).unwrap_or_else(|| "0,00".to_string()),
            responsible: field(columns.responsible),
            due: field(columns.due),
            origin: field(columns.origin),
        });
    }

    if rows.is_empty() {
        return Err(AppError::BadRequest(
            "The file is empty or not in the expected format".to_string(),
        ));
    }
    Ok(rows)
}

/// `DD/MM/YYYY` becomes `YYYY-MM-DD`; ISO dates pass through; empty is today
pub fn to_iso_date(raw: Option<&str>, today: NaiveDate) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return today.format("%Y-%m-%d").to_string();
    };
    if raw.contains('-') {
        return raw.to_string();
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if let [day, month, year] = parts.as_slice() {
        return format!("{}-{:0>2}-{:0>2}", year, month, day);
    }
    raw.to_string()
}

/// Parse and import a spreadsheet through the write queue.
///
/// Returns the number of tasks created.
pub async fn import_payments(
    queue: &WriteQueue,
    db: DatabaseConnection,
    bytes: Vec<u8>,
    fallback_user: String,
) -> Result<usize> {
    let rows = parse_payments(&bytes)?;
    tracing::info!(rows = rows.len(), "Importing payment spreadsheet");

    queue
        .submit("import-payments", move || async move {
            write_payments(&db, rows, &fallback_user).await
        })
        .await
}

async fn write_payments(
    db: &DatabaseConnection,
    rows: Vec<PaymentRow>,
    fallback_user: &str,
) -> Result<usize> {
    let now = chrono::Utc::now();
    let today = chrono::Local::now().date_naive();
    let mut used_ids = HashSet::new();
    let txn = db.begin().await?;

    for row in &rows {
        let holder = match row.responsible.as_deref() {
            Some(name) => {
                user::Entity::find()
                    .filter(user::Column::Name.eq(name))
                    .one(&txn)
                    .await?
            }
            None => None,
        };
        let responsible = holder
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| fallback_user.to_string());

        let mut id = generate_task_id();
        while !used_ids.insert(id.clone()) {
            id = generate_task_id();
        }

        let title = row.task_title();
        task::ActiveModel {
            id: Set(id.clone()),
            title: Set(title.clone()),
            responsible: Set(responsible),
            status: Set(TaskStatus::Pending.as_str().to_string()),
            priority: Set(IMPORT_PRIORITY.to_string()),
            deadline: Set(to_iso_date(row.due.as_deref(), today)),
            source: Set(IMPORT_SOURCE.to_string()),
            parent_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        task_history::ActiveModel {
            task_id: Set(id),
            user: Set(IMPORT_AUTHOR.to_string()),
            text: Set(format!(
                "Generated from spreadsheet. Origin: {}",
                row.origin.as_deref().unwrap_or("-")
            )),
            kind: Set(KIND_SYSTEM.to_string()),
            action: Set(None),
            target_user: Set(None),
            file_url: Set(None),
            file_name: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(holder) = &holder {
            NotificationService::create(
                &txn,
                &holder.id,
                &format!("New scheduled payment: {}", title),
            )
            .await?;
        }
    }

    txn.commit().await?;
    tracing::info!(total = rows.len(), "Payment spreadsheet imported");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_to_iso_date() {
        assert_eq!(to_iso_date(Some("05/04/2026"), today()), "2026-04-05");
        assert_eq!(to_iso_date(Some("5/4/2026"), today()), "2026-04-05");
        assert_eq!(to_iso_date(Some("2026-04-05"), today()), "2026-04-05");
        assert_eq!(to_iso_date(Some("  "), today()), "2026-03-15");
        assert_eq!(to_iso_date(None, today()), "2026-03-15");
        assert_eq!(to_iso_date(Some("amanha"), today()), "amanha");
    }

    #[test]
    fn test_parse_payments_case_insensitive_headers() {
        let csv = "titulo;VALOR;Responsavel;Vencimento;origem\n\
                   Aluguel;1.500,00;Ana;10/02/2026;Financeiro\n\
                   ;;;;\n\
                   Internet;199,90;;;\n";
        let rows = parse_payments(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Aluguel");
        assert_eq!(rows[0].amount, "1.500,00");
        assert_eq!(rows[0].responsible.as_deref(), Some("Ana"));
        assert_eq!(rows[0].due.as_deref(), Some("10/02/2026"));
        assert_eq!(rows[1].responsible, None);
        assert_eq!(rows[1].task_title(), "💰 Internet - R$ 199,90");
    }

    #[test]
    fn test_parse_payments_strips_bom() {
        let csv = "\u{feff}Titulo;Valor\nLuz;80,00\n";
        let rows = parse_payments(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].title, "Luz");
    }

    #[test]
    fn test_parse_payments_rejects_empty_or_unknown_layout() {
        assert!(matches!(parse_payments(b""), Err(AppError::BadRequest(_))));
        assert!(matches!(
            parse_payments(b"Titulo;Valor\n"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_payments(b"name,amount\nx,1\n"),
            Err(AppError::BadRequest(_))
        ));
    }
}
