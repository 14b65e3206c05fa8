//! Task endpoint integration tests
//!
//! Covers:
//! - POST /tasks (multipart, with and without attachment)
//! - GET /tasks visibility and view modes
//! - PUT /tasks/{id} lifecycle actions
//! - POST /tasks/{id}/upload
//! - DELETE /tasks/{id}

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{
    create_admin, create_staff, delete, get, json_body, send_json, send_multipart, spawn_app,
    Part, TestApp,
};

// ============================================================================
// Helpers
// ============================================================================

async fn create_task(app: &TestApp, title: &str, responsible: &str, creator: &str) -> Value {
    let response = send_multipart(
        &app.router,
        "/tasks",
        &[
            Part::Text("title", title),
            Part::Text("responsible", responsible),
            Part::Text("priority", "Alta"),
            Part::Text("deadline", "2026-02-01"),
            Part::Text("creatorName", creator),
        ],
    )
    .await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body
}

async fn act(app: &TestApp, id: &str, body: Value) -> (StatusCode, Value) {
    json_body(send_json(&app.router, "PUT", &format!("/tasks/{}", id), body).await).await
}

async fn detail(app: &TestApp, id: &str) -> Value {
    let (status, body) = json_body(get(&app.router, &format!("/tasks/{}", id)).await).await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn history_len(task: &Value) -> usize {
    task["history"].as_array().map(Vec::len).unwrap_or_default()
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_task_starts_pending_with_history_and_notification() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let bia = create_staff(&app.state.db, "Bia", "Varejo").await;

    let response = send_multipart(
        &app.router,
        "/tasks",
        &[
            Part::Text("title", "Conferir estoque"),
            Part::Text("responsible", "Bia"),
            Part::Text("priority", "Media"),
            Part::Text("deadline", "2026-02-10"),
            Part::Text("creatorName", "Ana"),
            Part::Text("description", "Loja do centro"),
        ],
    )
    .await;
    let (status, created) = json_body(response).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["user"], "Bia");
    assert!(created["id"].as_str().unwrap().starts_with("TASK-"));

    let task = detail(&app, created["id"].as_str().unwrap()).await;
    let history = task["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["text"], "Started the flow");
    assert_eq!(history[0]["user"], "Ana");
    assert_eq!(history[0]["type"], "system");
    assert_eq!(history[1]["text"], "Loja do centro");
    assert_eq!(history[1]["type"], "message");

    let (_, notifications) =
        json_body(get(&app.router, &format!("/notifications?userId={}", bia.id)).await).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["text"], "New task: Conferir estoque");
}

#[tokio::test]
async fn test_create_task_with_attachment_stores_file() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;

    let response = send_multipart(
        &app.router,
        "/tasks",
        &[
            Part::Text("title", "Nota fiscal"),
            Part::Text("responsible", "Ana"),
            Part::Text("priority", "Baixa"),
            Part::Text("deadline", "2026-02-10"),
            Part::Text("creatorName", "Ana"),
            Part::File {
                field: "file",
                file_name: "nota fiscal.pdf",
                content: b"%PDF-1.4 test",
            },
        ],
    )
    .await;
    let (status, created) = json_body(response).await;
    assert_eq!(status, StatusCode::CREATED);

    let task = detail(&app, created["id"].as_str().unwrap()).await;
    let file_entry = task["history"]
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["type"] == "file")
        .expect("file history entry");
    assert_eq!(file_entry["fileName"], "nota fiscal.pdf");

    let url = file_entry["fileUrl"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    let stored_name = url.trim_start_matches("/uploads/");
    let stored = std::fs::read(app.uploads.path().join(stored_name)).unwrap();
    assert_eq!(stored, b"%PDF-1.4 test");
}

#[tokio::test]
async fn test_create_task_requires_title() {
    let app = spawn_app().await;

    let response = send_multipart(
        &app.router,
        "/tasks",
        &[
            Part::Text("responsible", "Ana"),
            Part::Text("creatorName", "Ana"),
        ],
    )
    .await;
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_rejected_creation_leaves_no_upload_behind() {
    let app = spawn_app().await;

    let response = send_multipart(
        &app.router,
        "/tasks",
        &[
            Part::Text("responsible", "Ana"),
            Part::Text("creatorName", "Ana"),
            Part::File {
                field: "file",
                file_name: "boleto.pdf",
                content: b"%PDF",
            },
        ],
    )
    .await;
    let (status, _) = json_body(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let leftover = std::fs::read_dir(app.uploads.path()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_get_unknown_task_returns_404() {
    let app = spawn_app().await;
    let (status, body) = json_body(get(&app.router, "/tasks/TASK-0-0000").await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("error").is_some());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_pass_return_finish_reopen() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let bia = create_staff(&app.state.db, "Bia", "Varejo").await;

    let created = create_task(&app, "Repor vitrine", "Ana", "Ana").await;
    let id = created["id"].as_str().unwrap();

    let (status, task) = act(
        &app,
        id,
        json!({"actionType": "start_progress", "currentUser": "Ana"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "doing");

    let (status, task) = act(
        &app,
        id,
        json!({
            "actionType": "pass",
            "currentUser": "Ana",
            "targetUser": "Bia",
            "comment": "confere o preco",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["user"], "Bia");

    let (_, notifications) =
        json_body(get(&app.router, &format!("/notifications?userId={}", bia.id)).await).await;
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["text"] == "Ana passed you a task: Repor vitrine"));

    // Without a target, return goes back to whoever passed it
    let (status, task) = act(&app, id, json!({"actionType": "return", "currentUser": "Bia"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["user"], "Ana");
    assert_eq!(task["status"], "pending");

    let (status, task) = act(&app, id, json!({"actionType": "finish", "currentUser": "Ana"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "done");

    let (status, _) = act(
        &app,
        id,
        json!({"actionType": "comment", "currentUser": "Ana", "comment": "late"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, task) = act(&app, id, json!({"actionType": "reopen", "currentUser": "Ana"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "pending");

    let task = detail(&app, id).await;
    let texts: Vec<&str> = task["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["text"].as_str().unwrap())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Started the flow",
            "Started working on this task.",
            "Passed to Bia: confere o preco",
            "Returned to Ana",
            "Finished the task.",
            "Reopened the task.",
        ]
    );
}

#[tokio::test]
async fn test_finish_twice_is_idempotent() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let created = create_task(&app, "Fechar caixa", "Ana", "Ana").await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = act(&app, id, json!({"actionType": "finish", "currentUser": "Ana"})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, task) = act(&app, id, json!({"actionType": "finish", "currentUser": "Ana"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "done");

    let task = detail(&app, id).await;
    let finishes = task["history"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|h| h["action"] == "finish")
        .count();
    assert_eq!(finishes, 1);
}

#[tokio::test]
async fn test_every_transition_appends_one_history_entry() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    create_staff(&app.state.db, "Caio", "Varejo").await;
    let created = create_task(&app, "Inventario", "Ana", "Ana").await;
    let id = created["id"].as_str().unwrap();

    let mut expected = history_len(&detail(&app, id).await);
    let steps = [
        json!({"actionType": "comment", "currentUser": "Ana", "comment": "primeira nota"}),
        json!({"actionType": "start_progress", "currentUser": "Ana"}),
        json!({"actionType": "pass", "currentUser": "Ana", "user": "Caio"}),
        json!({"comment": "sem actionType vira comentario", "currentUser": "Caio"}),
        json!({"status": "done", "currentUser": "Caio"}),
    ];

    for step in steps {
        let before = detail(&app, id).await;
        let (status, _) = act(&app, id, step).await;
        assert_eq!(status, StatusCode::OK);
        expected += 1;

        let after = detail(&app, id).await;
        assert_eq!(history_len(&after), expected);
        // Earlier entries are never rewritten
        assert_eq!(
            after["history"].as_array().unwrap()[..history_len(&before)],
            before["history"].as_array().unwrap()[..]
        );
    }
}

#[tokio::test]
async fn test_pass_to_unknown_user_is_rejected() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let created = create_task(&app, "Trocar etiqueta", "Ana", "Ana").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = act(
        &app,
        id,
        json!({"actionType": "pass", "currentUser": "Ana", "targetUser": "Fantasma"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Fantasma"));
    assert_eq!(detail(&app, id).await["user"], "Ana");
}

#[tokio::test]
async fn test_return_to_unknown_user_is_rejected() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    create_staff(&app.state.db, "Bruno", "Varejo").await;
    let created = create_task(&app, "Conferir estoque", "Ana", "Ana").await;
    let id = created["id"].as_str().unwrap();
    act(
        &app,
        id,
        json!({"actionType": "pass", "currentUser": "Ana", "targetUser": "Bruno"}),
    )
    .await;

    let (status, body) = act(
        &app,
        id,
        json!({"actionType": "return", "currentUser": "Bruno", "user": "Ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Ghost"));

    let task = detail(&app, id).await;
    assert_eq!(task["user"], "Bruno");
    assert_eq!(history_len(&task), 2);

    let (status, body) = act(
        &app,
        id,
        json!({"actionType": "return", "currentUser": "Bruno", "user": "Ana"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], "Ana");
}

#[tokio::test]
async fn test_start_progress_twice_is_rejected() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let created = create_task(&app, "Ligar fornecedor", "Ana", "Ana").await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = act(
        &app,
        id,
        json!({"actionType": "start_progress", "currentUser": "Ana"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = act(
        &app,
        id,
        json!({"actionType": "start_progress", "currentUser": "Ana"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_parent_cannot_finish_with_open_subtask() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let parent = create_task(&app, "Abrir loja", "Ana", "Ana").await;
    let parent_id = parent["id"].as_str().unwrap();

    let response = send_multipart(
        &app.router,
        "/tasks",
        &[
            Part::Text("title", "Instalar vitrine"),
            Part::Text("responsible", "Ana"),
            Part::Text("creatorName", "Ana"),
            Part::Text("parentId", parent_id),
        ],
    )
    .await;
    let (status, child) = json_body(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(child["parentId"], parent_id);

    let (status, _) = act(
        &app,
        parent_id,
        json!({"actionType": "finish", "currentUser": "Ana"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let task = detail(&app, parent_id).await;
    assert_eq!(task["subTasks"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Attachments and deletion
// ============================================================================

#[tokio::test]
async fn test_upload_requires_file_and_open_task() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let created = create_task(&app, "Recibo", "Ana", "Ana").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/tasks/{}/upload", id);

    let response = send_multipart(&app.router, &uri, &[Part::Text("currentUser", "Ana")]).await;
    let (status, _) = json_body(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let file = Part::File {
        field: "file",
        file_name: "recibo.txt",
        content: b"pago",
    };
    let (status, entry) = json_body(
        send_multipart(&app.router, &uri, &[Part::Text("currentUser", "Ana"), file]).await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["type"], "file");
    assert_eq!(entry["user"], "Ana");

    act(&app, id, json!({"actionType": "finish", "currentUser": "Ana"})).await;
    let file = Part::File {
        field: "file",
        file_name: "tarde.txt",
        content: b"tarde",
    };
    let (status, _) = json_body(
        send_multipart(&app.router, &uri, &[Part::Text("currentUser", "Ana"), file]).await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_task_detaches_subtasks() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    let parent = create_task(&app, "Campanha", "Ana", "Ana").await;
    let parent_id = parent["id"].as_str().unwrap();

    let response = send_multipart(
        &app.router,
        "/tasks",
        &[
            Part::Text("title", "Cartazes"),
            Part::Text("responsible", "Ana"),
            Part::Text("creatorName", "Ana"),
            Part::Text("parentId", parent_id),
        ],
    )
    .await;
    let (_, child) = json_body(response).await;

    let (status, _) = json_body(delete(&app.router, &format!("/tasks/{}", parent_id)).await).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = json_body(get(&app.router, &format!("/tasks/{}", parent_id)).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let child = detail(&app, child["id"].as_str().unwrap()).await;
    assert_eq!(child["parentId"], Value::Null);

    let (status, _) = json_body(delete(&app.router, &format!("/tasks/{}", parent_id)).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_applies_visibility_and_view_modes() {
    let app = spawn_app().await;
    create_staff(&app.state.db, "Ana", "Varejo").await;
    create_staff(&app.state.db, "Bia", "Varejo").await;
    create_staff(&app.state.db, "Davi", "Financeiro").await;
    create_admin(&app.state.db, "Chefe").await;

    let own = create_task(&app, "Da Ana", "Ana", "Ana").await;
    create_task(&app, "Da Bia", "Bia", "Bia").await;
    create_task(&app, "Do Davi", "Davi", "Davi").await;

    let list = |user: &str, mode: &str| {
        let uri = format!("/tasks?user={}&viewMode={}", user, mode);
        let router = app.router.clone();
        async move {
            let (status, body) = json_body(get(&router, &uri).await).await;
            assert_eq!(status, StatusCode::OK);
            body.as_array()
                .unwrap()
                .iter()
                .map(|t| t["title"].as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        }
    };

    // Same operation shares tasks, other operations stay hidden
    let mut ana = list("Ana", "team_pending").await;
    ana.sort();
    assert_eq!(ana, vec!["Da Ana", "Da Bia"]);

    assert_eq!(list("Ana", "mine_pending").await, vec!["Da Ana"]);
    assert_eq!(list("Chefe", "all").await.len(), 3);
    // Admins are never narrowed by mine_ modes
    assert_eq!(list("Chefe", "mine_pending").await.len(), 3);
    assert!(list("Ninguem", "all").await.is_empty());

    let id = own["id"].as_str().unwrap();
    act(&app, id, json!({"actionType": "finish", "currentUser": "Ana"})).await;
    assert!(list("Ana", "mine_pending").await.is_empty());
    assert_eq!(list("Ana", "mine_done").await, vec!["Da Ana"]);
    assert_eq!(list("Ana", "completed").await.len(), 2);

    let (_, tasks) = json_body(get(&app.router, "/tasks?user=Ana&viewMode=mine_done").await).await;
    assert_eq!(tasks[0]["operation"], "Varejo");
    assert_eq!(tasks[0]["creatorOperation"], "Varejo");
}
