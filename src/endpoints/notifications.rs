use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::notification;
use crate::state::AppState;

pub fn notifications_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", put(mark_all_as_read))
        .route("/{id}", put(mark_as_read).delete(delete_notification))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReadAllResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

fn required_user(user_id: Option<String>) -> Result<String> {
    user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    params(UserQuery),
    responses((status = 200, body = Vec<notification::Model>))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<notification::Model>>> {
    let Some(user_id) = query.user_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.notification.list_unread(user_id.trim()).await?))
}

#[utoipa::path(
    put,
    path = "/notifications/{id}",
    tag = "Notifications",
    params(("id" = i64, Path, description = "Notification id")),
    request_body = MarkReadRequest,
    responses(
        (status = 200, body = SuccessResponse),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn mark_as_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<SuccessResponse>> {
    let user_id = required_user(request.user_id)?;
    state.notification.mark_as_read(id, &user_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    put,
    path = "/notifications/read-all",
    tag = "Notifications",
    params(UserQuery),
    responses((status = 200, body = ReadAllResponse))
)]
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ReadAllResponse>> {
    let user_id = required_user(query.user_id)?;
    let updated = state.notification.mark_all_as_read(&user_id).await?;
    Ok(Json(ReadAllResponse { updated }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "Notifications",
    params(
        ("id" = i64, Path, description = "Notification id"),
        UserQuery
    ),
    responses(
        (status = 200, body = SuccessResponse),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SuccessResponse>> {
    let user_id = required_user(query.user_id)?;
    state.notification.delete_notification(id, &user_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
