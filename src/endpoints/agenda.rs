use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::agenda_event;
use crate::services::agenda::{self, NewAgendaEvent};
use crate::services::stats::{self, MemberStats};
use crate::state::AppState;

pub fn agenda_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", put(update_event).delete(delete_event))
        .with_state(state)
}

pub fn stats_routes(state: AppState) -> Router {
    Router::new()
        .route("/manager-stats", get(manager_stats))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AgendaQuery {
    pub user_id: Option<String>,
    /// Day as stored, e.g. `2026-01-20`
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateEventRequest {
    pub completed: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ManagerStatsQuery {
    pub manager_name: Option<String>,
}

// ============================================================================
// Agenda
// ============================================================================

#[utoipa::path(
    get,
    path = "/agenda",
    tag = "Agenda",
    params(AgendaQuery),
    responses((status = 200, body = Vec<agenda_event::Model>))
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<Vec<agenda_event::Model>>> {
    let (Some(user_id), Some(date)) = (query.user_id, query.date) else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(agenda::list_events(&state.db, user_id.trim(), date.trim()).await?))
}

#[utoipa::path(
    post,
    path = "/agenda",
    tag = "Agenda",
    request_body = NewAgendaEvent,
    responses(
        (status = 201, body = agenda_event::Model),
        (status = 400, description = "Missing field or unknown user")
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<NewAgendaEvent>,
) -> Result<(StatusCode, Json<agenda_event::Model>)> {
    let created = agenda::create_event(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/agenda/{id}",
    tag = "Agenda",
    params(("id" = i64, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, body = agenda_event::Model),
        (status = 404, description = "Event not found")
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<agenda_event::Model>> {
    Ok(Json(
        agenda::set_completed(&state.db, id, request.completed).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/agenda/{id}",
    tag = "Agenda",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, body = DeletedResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>> {
    agenda::delete_event(&state.db, id).await?;
    Ok(Json(DeletedResponse { success: true }))
}

// ============================================================================
// Team statistics
// ============================================================================

#[utoipa::path(
    get,
    path = "/manager-stats",
    tag = "Agenda",
    params(ManagerStatsQuery),
    responses((status = 200, body = Vec<MemberStats>))
)]
pub async fn manager_stats(
    State(state): State<AppState>,
    Query(query): Query<ManagerStatsQuery>,
) -> Result<Json<Vec<MemberStats>>> {
    let Some(name) = query.manager_name.filter(|n| !n.trim().is_empty()) else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(stats::manager_stats(&state.db, name.trim()).await?))
}
