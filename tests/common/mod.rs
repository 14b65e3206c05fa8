//! Shared helpers for integration tests.
//!
//! Databases are in-memory SQLite migrated with the real migrators, so each
//! test gets an isolated, fully-shaped schema.

#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt;

use telefluxo::config::import::ImportConfig;
use telefluxo::config::storage::StorageConfig;
use telefluxo::db::{connect_reporting_with_url, connect_with_url};
use telefluxo::endpoints::create_router;
use telefluxo::models::user;
use telefluxo::services::security::hash_password;
use telefluxo::services::WriteQueue;
use telefluxo::state::AppState;

pub const MULTIPART_BOUNDARY: &str = "telefluxo-test-boundary";

/// Create an in-memory operational database with all migrations applied
pub async fn create_test_db() -> DatabaseConnection {
    connect_with_url("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Create an in-memory reporting database with all migrations applied
pub async fn create_test_reporting_db() -> DatabaseConnection {
    connect_reporting_with_url("sqlite::memory:")
        .await
        .expect("Failed to create test reporting database")
}

/// Storage rooted in a temporary directory
pub fn test_storage(upload_dir: &Path) -> StorageConfig {
    StorageConfig {
        upload_dir: upload_dir.to_path_buf(),
        public_url: String::new(),
        max_upload_bytes: 1024 * 1024,
    }
}

pub fn test_import_config() -> ImportConfig {
    ImportConfig {
        fallback_user: "Andre".to_string(),
        write_queue_capacity: 16,
    }
}

/// Build an `AppState` around test databases
pub fn build_app_state(
    db: DatabaseConnection,
    reporting_db: DatabaseConnection,
    upload_dir: &Path,
) -> AppState {
    AppState::new(
        db,
        reporting_db,
        WriteQueue::new(16),
        test_storage(upload_dir),
        test_import_config(),
    )
}

/// A ready router plus the state behind it.
///
/// Keep the struct alive for the whole test: dropping it removes the upload dir.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub uploads: tempfile::TempDir,
}

pub async fn spawn_app() -> TestApp {
    let uploads = tempfile::tempdir().expect("Failed to create upload dir");
    let state = build_app_state(
        create_test_db().await,
        create_test_reporting_db().await,
        uploads.path(),
    );
    TestApp {
        router: create_router(state.clone()),
        state,
        uploads,
    }
}

/// Insert a user with a bcrypt password
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
    operation: &str,
) -> user::Model {
    let now = chrono::Utc::now();
    user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password: Set(hash_password(password).unwrap()),
        role: Set(role.to_string()),
        department: Set(String::new()),
        operation: Set(operation.to_string()),
        is_admin: Set(false),
        manager_id: Set(None),
        allowed_stores: Set(String::new()),
        status: Set(user::STATUS_ACTIVE.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

/// Insert a staff member with defaults for everything but the name
pub async fn create_staff(db: &DatabaseConnection, name: &str, operation: &str) -> user::Model {
    let email = format!("{}@telefluxo.test", name.to_lowercase().replace(' ', "."));
    create_test_user(db, name, &email, "secret", "Vendedor", operation).await
}

/// Insert a user with the admin flag set
pub async fn create_admin(db: &DatabaseConnection, name: &str) -> user::Model {
    let created = create_staff(db, name, "Diretoria").await;
    let mut active: user::ActiveModel = created.into();
    active.is_admin = Set(true);
    active.update(db).await.unwrap()
}

// ============================================================================
// HTTP helpers
// ============================================================================

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn delete(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .method("DELETE")
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

/// One part of a multipart body
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        file_name: &'a str,
        content: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            Part::File {
                field,
                file_name,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        field, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub async fn send_multipart(router: &Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(router, request).await
}

/// Status plus parsed JSON body
pub async fn json_body(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).to_string())
        })
    };
    (status, value)
}
