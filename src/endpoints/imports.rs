use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::endpoints::extractors::MultipartForm;
use crate::error::{AppError, Result};
use crate::services::import::import_payments;
use crate::state::AppState;

pub fn imports_routes(state: AppState) -> Router {
    Router::new()
        .route("/import-payments", post(import_payment_sheet))
        .with_state(state)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ImportResponse {
    pub message: String,
    pub total: usize,
}

/// Turn every row of a recurring-payments sheet into a pending task
#[utoipa::path(
    post,
    path = "/import-payments",
    tag = "Import",
    request_body(content_type = "multipart/form-data", description = "`file`: `;`-separated CSV"),
    responses(
        (status = 200, body = ImportResponse),
        (status = 400, description = "No file, or the file is empty or malformed"),
        (status = 503, description = "Server is shutting down")
    )
)]
pub async fn import_payment_sheet(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>> {
    let form = MultipartForm::read(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let total = import_payments(
        &state.write_queue,
        state.db.clone(),
        file.bytes,
        state.import.fallback_user.clone(),
    )
    .await?;

    Ok(Json(ImportResponse {
        message: format!("{} tasks imported", total),
        total,
    }))
}
