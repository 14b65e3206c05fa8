use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::endpoints::extractors::MultipartForm;
use crate::error::{AppError, Result};
use crate::models::{task, task_history};
use crate::services::tasks::{self, IncomingFile, NewTask, TaskDetail, TaskUpdate, TaskView};
use crate::state::AppState;

/// Create task routes
pub fn tasks_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/{id}/upload", post(upload_attachment))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// Name of the user looking at the list
    pub user: Option<String>,
    /// e.g. `mine_pending`, `team_done`, `completed`, `all`
    pub view_mode: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// One of start_progress, comment, pass, return, finish, reopen
    pub action_type: Option<String>,
    /// Legacy clients send the wanted status instead of an action
    pub status: Option<String>,
    pub comment: Option<String>,
    pub current_user: Option<String>,
    /// Target of a pass or return
    #[serde(alias = "user")]
    pub target_user: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TaskMessage {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "Tasks",
    params(TaskListQuery),
    responses((status = 200, body = Vec<TaskView>))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskView>>> {
    let Some(user) = query.user.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(Json(Vec::new()));
    };
    let mode = query.view_mode.as_deref().unwrap_or_default();

    Ok(Json(tasks::list_for_user(&state.db, user, mode).await?))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, body = TaskDetail),
        (status = 404, description = "Task not found")
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskDetail>> {
    Ok(Json(tasks::get_task(&state.db, &id).await?))
}

/// Create a task from a multipart form with an optional `file` part
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "Tasks",
    request_body(
        content_type = "multipart/form-data",
        description = "title, responsible, priority, deadline, creatorName, \
                       description, source, parentId, file"
    ),
    responses(
        (status = 201, body = task::Model),
        (status = 400, description = "Missing required field")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<task::Model>)> {
    let form = MultipartForm::read(multipart).await?;

    let new = NewTask {
        title: form.text("title").unwrap_or_default(),
        responsible: form.text("responsible").unwrap_or_default(),
        priority: form.text("priority").unwrap_or_default(),
        deadline: form.text("deadline").unwrap_or_default(),
        creator: form.text("creatorName").unwrap_or_default(),
        description: form.text("description"),
        source: form.text("source"),
        parent_id: form.text("parentId"),
    };

    let attachment = form.file.as_ref().map(|file| IncomingFile {
        file_name: &file.file_name,
        bytes: &file.bytes,
    });

    let created = tasks::create_task(&state.db, &state.storage, new, attachment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Apply a lifecycle action
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, body = task::Model),
        (status = 400, description = "Action not allowed in the current status"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<task::Model>> {
    let update = TaskUpdate {
        action: request.action_type,
        status: request.status,
        comment: request.comment,
        actor: request.current_user,
        target: request.target_user,
    };

    Ok(Json(tasks::apply_update(&state.db, &id, update).await?))
}

#[utoipa::path(
    post,
    path = "/tasks/{id}/upload",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task id")),
    request_body(content_type = "multipart/form-data", description = "currentUser, file"),
    responses(
        (status = 200, body = task_history::Model),
        (status = 400, description = "No file, or the task is finished"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<task_history::Model>> {
    let form = MultipartForm::read(multipart).await?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let actor = form.text("currentUser").unwrap_or_default();

    let entry = tasks::attach_file(
        &state.db,
        &state.storage,
        &id,
        &actor,
        IncomingFile {
            file_name: &file.file_name,
            bytes: &file.bytes,
        },
    )
    .await?;

    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, body = TaskMessage),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskMessage>> {
    tasks::delete_task(&state.db, &id).await?;
    Ok(Json(TaskMessage {
        message: "Task deleted".to_string(),
    }))
}
