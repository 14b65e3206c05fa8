use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::Result;
use crate::models::{announcement, dept_message};
use crate::services::announcements::{self, NewAnnouncement, NewDeptMessage};
use crate::state::AppState;

pub fn announcements_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_announcements).post(create_announcement))
        .route("/{id}", delete(delete_announcement))
        .with_state(state)
}

pub fn dept_routes(state: AppState) -> Router {
    Router::new()
        .route("/dept-messages", post(post_dept_message))
        .route("/dept-messages/{dept}", get(list_dept_messages))
        .with_state(state)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RemovedResponse {
    pub success: bool,
}

// ============================================================================
// Announcements
// ============================================================================

#[utoipa::path(
    get,
    path = "/announcements",
    tag = "Announcements",
    responses((status = 200, body = Vec<announcement::Model>))
)]
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<announcement::Model>>> {
    Ok(Json(announcements::list_announcements(&state.db).await?))
}

#[utoipa::path(
    post,
    path = "/announcements",
    tag = "Announcements",
    request_body = NewAnnouncement,
    responses(
        (status = 201, body = announcement::Model),
        (status = 400, description = "Missing title, content or author")
    )
)]
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(request): Json<NewAnnouncement>,
) -> Result<(StatusCode, Json<announcement::Model>)> {
    let created = announcements::create_announcement(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/announcements/{id}",
    tag = "Announcements",
    params(("id" = i64, Path, description = "Announcement id")),
    responses(
        (status = 200, body = RemovedResponse),
        (status = 404, description = "Announcement not found")
    )
)]
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RemovedResponse>> {
    announcements::delete_announcement(&state.db, id).await?;
    Ok(Json(RemovedResponse { success: true }))
}

// ============================================================================
// Department bulletins
// ============================================================================

#[utoipa::path(
    get,
    path = "/dept-messages/{dept}",
    tag = "Announcements",
    params(("dept" = String, Path, description = "Department name")),
    responses((status = 200, body = Vec<dept_message::Model>))
)]
pub async fn list_dept_messages(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<Vec<dept_message::Model>>> {
    Ok(Json(announcements::list_dept_messages(&state.db, &dept).await?))
}

#[utoipa::path(
    post,
    path = "/dept-messages",
    tag = "Announcements",
    request_body = NewDeptMessage,
    responses(
        (status = 201, body = dept_message::Model),
        (status = 400, description = "Missing department, author or content")
    )
)]
pub async fn post_dept_message(
    State(state): State<AppState>,
    Json(request): Json<NewDeptMessage>,
) -> Result<(StatusCode, Json<dept_message::Model>)> {
    let created = announcements::post_dept_message(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
