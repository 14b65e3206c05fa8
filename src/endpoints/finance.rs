use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::finance_entry;
use crate::services::finance::{self, CreatedTitles, FinancePage, NewFinanceTitle};
use crate::state::AppState;

pub fn finance_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_titles).post(create_titles))
        .route("/all", delete(delete_all_titles))
        .route("/{id}", delete(delete_title))
        .route("/{id}/status", put(update_status))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FinanceQuery {
    /// Page number (1-based)
    pub page: Option<u64>,
    /// Titles per page
    pub limit: Option<u64>,
    /// `EXPENSE` (default) or `INCOME`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct StatusRequest {
    /// `PAGO` or `PENDENTE`
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Titles
// ============================================================================

#[utoipa::path(
    get,
    path = "/finance",
    tag = "Finance",
    params(FinanceQuery),
    responses(
        (status = 200, body = FinancePage),
        (status = 400, description = "Unknown title type")
    )
)]
pub async fn list_titles(
    State(state): State<AppState>,
    Query(query): Query<FinanceQuery>,
) -> Result<Json<FinancePage>> {
    let page =
        finance::list_titles(&state.db, query.kind.as_deref(), query.page, query.limit).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/finance",
    tag = "Finance",
    request_body = NewFinanceTitle,
    responses(
        (status = 201, body = CreatedTitles),
        (status = 400, description = "Missing supplier, value or due date")
    )
)]
pub async fn create_titles(
    State(state): State<AppState>,
    Json(request): Json<NewFinanceTitle>,
) -> Result<(StatusCode, Json<CreatedTitles>)> {
    let created = finance::create_titles(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/finance/{id}/status",
    tag = "Finance",
    params(("id" = String, Path, description = "Title id")),
    request_body = StatusRequest,
    responses(
        (status = 200, body = finance_entry::Model),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Title not found")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<finance_entry::Model>> {
    Ok(Json(finance::set_status(&state.db, &id, &request.status).await?))
}

#[utoipa::path(
    delete,
    path = "/finance/{id}",
    tag = "Finance",
    params(("id" = String, Path, description = "Title id")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 404, description = "Title not found")
    )
)]
pub async fn delete_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    finance::delete_title(&state.db, &id).await?;
    Ok(Json(MessageResponse {
        message: "Title deleted".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/finance/all",
    tag = "Finance",
    responses((status = 200, body = MessageResponse))
)]
pub async fn delete_all_titles(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    let deleted = finance::delete_all_titles(&state.db).await?;
    Ok(Json(MessageResponse {
        message: format!("{} titles deleted", deleted),
    }))
}
