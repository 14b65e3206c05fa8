pub mod agenda;
pub mod announcements;
pub mod auth;
pub mod extractors;
pub mod finance;
pub mod imports;
pub mod notifications;
pub mod reporting;
pub mod tasks;
pub mod users;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use utoipa::OpenApi;

use crate::config::CONFIG;
use crate::state::AppState;

/// Room for multipart boundaries and text fields around the file itself
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "Telefluxo API", description = "Task tracking and sales reporting"),
    paths(
        auth::login,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        tasks::list_tasks,
        tasks::get_task,
        tasks::create_task,
        tasks::update_task,
        tasks::upload_attachment,
        tasks::delete_task,
        notifications::list_notifications,
        notifications::mark_as_read,
        notifications::mark_all_as_read,
        notifications::delete_notification,
        agenda::list_events,
        agenda::create_event,
        agenda::update_event,
        agenda::delete_event,
        agenda::manager_stats,
        announcements::list_announcements,
        announcements::create_announcement,
        announcements::delete_announcement,
        announcements::list_dept_messages,
        announcements::post_dept_message,
        finance::list_titles,
        finance::create_titles,
        finance::update_status,
        finance::delete_title,
        finance::delete_all_titles,
        imports::import_payment_sheet,
        reporting::sync_sales,
        reporting::sync_sellers,
        reporting::list_sales,
        reporting::sales_summary,
        reporting::sales_chart,
        reporting::seller_ranking,
        reporting::seller_kpis,
        reporting::external_stores,
    )
)]
pub struct ApiDoc;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.storage.max_upload_bytes + FORM_OVERHEAD_BYTES;

    let system_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/version", get(get_version))
        .route("/api/openapi.json", get(openapi_document));

    Router::new()
        .merge(system_routes)
        .merge(auth::auth_routes(state.clone()))
        .nest("/users", users::users_routes(state.clone()))
        .nest("/tasks", tasks::tasks_routes(state.clone()))
        .nest(
            "/notifications",
            notifications::notifications_routes(state.clone()),
        )
        .nest("/agenda", agenda::agenda_routes(state.clone()))
        .merge(agenda::stats_routes(state.clone()))
        .nest(
            "/announcements",
            announcements::announcements_routes(state.clone()),
        )
        .merge(announcements::dept_routes(state.clone()))
        .nest("/finance", finance::finance_routes(state.clone()))
        .merge(imports::imports_routes(state.clone()))
        .nest("/api/sync", reporting::sync_routes(state.clone()))
        .merge(reporting::reporting_routes(state))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "backend": "rust"
    }))
}

async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
