//! Task storage, visibility and lifecycle application

use std::collections::HashMap;

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use crate::config::storage::StorageConfig;
use crate::error::{AppError, Result};
use crate::models::task_history::{KIND_FILE, KIND_MESSAGE, KIND_SYSTEM};
use crate::models::user::DEFAULT_OPERATION;
use crate::models::{task, task_history, user};
use crate::services::notification::NotificationService;
use crate::services::security::generate_task_id;
use crate::services::task_flow::{
    self, ActionRequest, Outcome, TaskAction, TaskSnapshot, TaskStatus,
};
use crate::services::uploads::{discard_upload, save_upload, StoredFile};

/// Text of the entry that opens every task's history
pub const FLOW_STARTED: &str = "Started the flow";

/// Task with its history and the operations of its holder and creator
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: task::Model,
    pub history: Vec<task_history::Model>,
    pub operation: String,
    pub creator_operation: String,
}

impl TaskView {
    /// Author of the opening history entry
    pub fn creator(&self) -> Option<&str> {
        creator_of(&self.history)
    }
}

/// Single task with history and direct sub-tasks
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: task::Model,
    pub history: Vec<task_history::Model>,
    pub sub_tasks: Vec<task::Model>,
}

/// Fields of a task being created
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub responsible: String,
    pub priority: String,
    pub deadline: String,
    pub creator: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub parent_id: Option<String>,
}

/// A file received with a request, not yet written to the upload dir
#[derive(Debug, Clone, Copy)]
pub struct IncomingFile<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

/// An update request as sent by the client
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub action: Option<String>,
    pub status: Option<String>,
    pub comment: Option<String>,
    pub actor: Option<String>,
    pub target: Option<String>,
}

/// Who is looking at the task list
#[derive(Debug, Clone)]
pub struct Viewer {
    pub name: String,
    pub operation: String,
    pub sees_everything: bool,
}

impl From<&user::Model> for Viewer {
    fn from(user: &user::Model) -> Self {
        Self {
            name: user.name.clone(),
            operation: user.operation.clone(),
            sees_everything: user.is_super_user(),
        }
    }
}

// ============================================================================
// Visibility
// ============================================================================

fn creator_of(history: &[task_history::Model]) -> Option<&str> {
    history
        .iter()
        .find(|h| h.text == FLOW_STARTED)
        .or_else(|| history.first())
        .map(|h| h.user.as_str())
}

/// Whether a task is linked to the viewer.
///
/// Admins see every task in every mode. Anyone else sees tasks they hold,
/// tasks they took part in, and tasks whose holder or creator works in the
/// viewer's operation. `mine_*` modes narrow this to tasks the viewer holds
/// or created.
pub fn is_visible(viewer: &Viewer, view: &TaskView, mode: &str) -> bool {
    if viewer.sees_everything {
        return true;
    }

    let holds = view.task.responsible == viewer.name;
    if mode.starts_with("mine_") {
        return holds || view.creator() == Some(viewer.name.as_str());
    }
    if holds {
        return true;
    }

    let participated = view.history.iter().any(|h| h.user == viewer.name);
    let same_operation =
        view.operation == viewer.operation || view.creator_operation == viewer.operation;

    participated || same_operation
}

/// Status filter encoded in the view mode
pub fn matches_status(mode: &str, status: &str) -> bool {
    if mode == "completed" || mode == "all" {
        return true;
    }
    if mode.ends_with("_pending") {
        return status == TaskStatus::Pending.as_str();
    }
    if mode.ends_with("_doing") {
        return status == TaskStatus::Doing.as_str();
    }
    if mode.ends_with("_done") {
        return status == TaskStatus::Done.as_str();
    }
    status != TaskStatus::Done.as_str()
}

// ============================================================================
// Queries
// ============================================================================

/// Tasks visible to the named user under the given view mode, newest first
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_name: &str,
    mode: &str,
) -> Result<Vec<TaskView>> {
    let Some(current) = user::Entity::find()
        .filter(user::Column::Name.eq(user_name))
        .one(db)
        .await?
    else {
        return Ok(Vec::new());
    };
    let viewer = Viewer::from(&current);

    let operations: HashMap<String, String> = user::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.name, u.operation))
        .collect();

    let tasks = task::Entity::find()
        .order_by_desc(task::Column::CreatedAt)
        .order_by_desc(task::Column::Id)
        .all(db)
        .await?;

    let mut histories = history_by_task(db).await?;

    let views: Vec<TaskView> = tasks
        .into_iter()
        .map(|task| {
            let history = histories.remove(&task.id).unwrap_or_default();
            let operation_of = |name: Option<&str>| {
                name.and_then(|n| operations.get(n))
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_OPERATION.to_string())
            };
            let operation = operation_of(Some(task.responsible.as_str()));
            let creator_operation = operation_of(creator_of(&history));
            TaskView {
                task,
                history,
                operation,
                creator_operation,
            }
        })
        .filter(|view| {
            is_visible(&viewer, view, mode) && matches_status(mode, &view.task.status)
        })
        .collect();

    tracing::debug!(user = %user_name, mode = %mode, count = views.len(), "Listed tasks");
    Ok(views)
}

async fn history_by_task(
    db: &DatabaseConnection,
) -> Result<HashMap<String, Vec<task_history::Model>>> {
    let mut grouped: HashMap<String, Vec<task_history::Model>> = HashMap::new();
    for entry in task_history::Entity::find()
        .order_by_asc(task_history::Column::Id)
        .all(db)
        .await?
    {
        grouped.entry(entry.task_id.clone()).or_default().push(entry);
    }
    Ok(grouped)
}

async fn history_of(
    db: &DatabaseConnection,
    task_id: &str,
) -> Result<Vec<task_history::Model>> {
    Ok(task_history::Entity::find()
        .filter(task_history::Column::TaskId.eq(task_id))
        .order_by_asc(task_history::Column::Id)
        .all(db)
        .await?)
}

async fn find_task(db: &DatabaseConnection, id: &str) -> Result<task::Model> {
    task::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
}

/// A task with its history and sub-tasks
pub async fn get_task(db: &DatabaseConnection, id: &str) -> Result<TaskDetail> {
    let task = find_task(db, id).await?;
    let history = history_of(db, id).await?;
    let sub_tasks = task::Entity::find()
        .filter(task::Column::ParentId.eq(id))
        .order_by_asc(task::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(TaskDetail {
        task,
        history,
        sub_tasks,
    })
}

// ============================================================================
// Mutations
// ============================================================================

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn history_entry(
    task_id: &str,
    user: &str,
    text: String,
    kind: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> task_history::ActiveModel {
    task_history::ActiveModel {
        task_id: Set(task_id.to_string()),
        user: Set(user.to_string()),
        text: Set(text),
        kind: Set(kind.to_string()),
        action: Set(None),
        target_user: Set(None),
        file_url: Set(None),
        file_name: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
}

/// Create a pending task, its opening history and the holder's notification.
///
/// The attachment is written only after the fields are validated and is
/// removed again when the task cannot be stored.
pub async fn create_task(
    db: &DatabaseConnection,
    storage: &StorageConfig,
    new: NewTask,
    attachment: Option<IncomingFile<'_>>,
) -> Result<task::Model> {
    let title = required(&new.title, "title")?;
    let responsible = required(&new.responsible, "responsible")?;
    let creator = required(&new.creator, "creatorName")?;

    let parent_id = new
        .parent_id
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    if let Some(parent_id) = &parent_id {
        if task::Entity::find_by_id(parent_id.clone()).one(db).await?.is_none() {
            return Err(AppError::BadRequest("Parent task not found".to_string()));
        }
    }

    let stored = match attachment {
        Some(file) => Some(save_upload(storage, file.file_name, file.bytes).await?),
        None => None,
    };

    let fields = ValidTask {
        title,
        responsible,
        creator,
        parent_id,
    };
    match insert_task(db, fields, &new, stored.clone()).await {
        Ok(created) => Ok(created),
        Err(error) => {
            if let Some(file) = &stored {
                discard_upload(storage, file).await;
            }
            Err(error)
        }
    }
}

struct ValidTask {
    title: String,
    responsible: String,
    creator: String,
    parent_id: Option<String>,
}

async fn insert_task(
    db: &DatabaseConnection,
    fields: ValidTask,
    new: &NewTask,
    attachment: Option<StoredFile>,
) -> Result<task::Model> {
    let ValidTask {
        title,
        responsible,
        creator,
        parent_id,
    } = fields;
    let now = chrono::Utc::now();
    let id = generate_task_id();
    let txn = db.begin().await?;

    let created = task::ActiveModel {
        id: Set(id.clone()),
        title: Set(title.clone()),
        responsible: Set(responsible.clone()),
        status: Set(TaskStatus::Pending.as_str().to_string()),
        priority: Set(new.priority.trim().to_string()),
        deadline: Set(new.deadline.trim().to_string()),
        source: Set(new
            .source
            .as_deref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Rotina".to_string())),
        parent_id: Set(parent_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    history_entry(&id, &creator, FLOW_STARTED.to_string(), KIND_SYSTEM, now)
        .insert(&txn)
        .await?;

    let description = new
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if let Some(description) = description {
        history_entry(&id, &creator, description.to_string(), KIND_MESSAGE, now)
            .insert(&txn)
            .await?;
    }

    if let Some(file) = attachment {
        let mut entry = history_entry(
            &id,
            &creator,
            format!("Attached on creation: {}", file.original_name),
            KIND_FILE,
            now,
        );
        entry.file_url = Set(Some(file.url));
        entry.file_name = Set(Some(file.original_name));
        entry.insert(&txn).await?;
    }

    NotificationService::notify_by_name(&txn, &responsible, &format!("New task: {}", title))
        .await?;

    txn.commit().await?;

    tracing::info!(task_id = %id, responsible = %responsible, "Task created");
    Ok(created)
}

/// Who handed the task to its current holder: the latest `pass` to them,
/// otherwise the task creator
fn previous_holder<'a>(
    history: &'a [task_history::Model],
    responsible: &str,
) -> Option<&'a str> {
    history
        .iter()
        .rev()
        .find(|h| {
            h.action.as_deref() == Some(TaskAction::Pass.as_str())
                && h.target_user.as_deref() == Some(responsible)
        })
        .map(|h| h.user.as_str())
        .or_else(|| creator_of(history))
}

/// Apply a lifecycle action to a task
pub async fn apply_update(
    db: &DatabaseConnection,
    id: &str,
    update: TaskUpdate,
) -> Result<task::Model> {
    let current = find_task(db, id).await?;
    let status = TaskStatus::parse(&current.status).ok_or_else(|| {
        AppError::Internal(format!("Task {} has unknown status {}", id, current.status))
    })?;

    let action = TaskAction::resolve(
        update.action.as_deref(),
        update.status.as_deref(),
        update.comment.as_deref(),
    )?;
    let actor = required(update.actor.as_deref().unwrap_or_default(), "currentUser")?;

    let target = update
        .target
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let (TaskAction::Pass | TaskAction::Return, Some(target)) = (action, target) {
        let exists = user::Entity::find()
            .filter(user::Column::Name.eq(target))
            .count(db)
            .await?
            > 0;
        if !exists {
            return Err(AppError::BadRequest(format!("Unknown user: {}", target)));
        }
    }

    let open_subtasks = task::Entity::find()
        .filter(task::Column::ParentId.eq(id))
        .filter(task::Column::Status.ne(TaskStatus::Done.as_str()))
        .count(db)
        .await?;

    let history = history_of(db, id).await?;
    let snapshot = TaskSnapshot {
        status,
        responsible: &current.responsible,
        title: &current.title,
        has_open_subtasks: open_subtasks > 0,
        previous_holder: previous_holder(&history, &current.responsible),
    };
    let request = ActionRequest {
        action,
        actor: &actor,
        comment: update.comment.as_deref(),
        target,
    };

    let transition = match task_flow::plan(&snapshot, &request)? {
        Outcome::Unchanged => {
            tracing::debug!(
                task_id = %id,
                action = action.as_str(),
                "Task already in requested state"
            );
            return Ok(current);
        }
        Outcome::Apply(transition) => transition,
    };

    let now = chrono::Utc::now();
    let txn = db.begin().await?;

    let mut active: task::ActiveModel = current.into();
    active.status = Set(transition.status.as_str().to_string());
    active.responsible = Set(transition.responsible.clone());
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    let draft = transition.history;
    let mut entry = history_entry(id, &draft.user, draft.text, draft.kind, now);
    entry.action = Set(Some(draft.action.as_str().to_string()));
    entry.target_user = Set(draft.target_user);
    entry.insert(&txn).await?;

    if let Some((name, text)) = &transition.notify {
        NotificationService::notify_by_name(&txn, name, text).await?;
    }

    txn.commit().await?;

    tracing::info!(
        task_id = %id,
        action = action.as_str(),
        status = transition.status.as_str(),
        "Task updated"
    );
    Ok(updated)
}

/// Store an attachment and record it in the task history
pub async fn attach_file(
    db: &DatabaseConnection,
    storage: &StorageConfig,
    id: &str,
    actor: &str,
    incoming: IncomingFile<'_>,
) -> Result<task_history::Model> {
    let current = find_task(db, id).await?;
    if current.status == TaskStatus::Done.as_str() {
        return Err(AppError::BadRequest("Task is finished".to_string()));
    }
    let actor = required(actor, "currentUser")?;

    let file = save_upload(storage, incoming.file_name, incoming.bytes).await?;

    let mut entry = history_entry(
        id,
        &actor,
        format!("Attached: {}", file.original_name),
        KIND_FILE,
        chrono::Utc::now(),
    );
    entry.file_url = Set(Some(file.url.clone()));
    entry.file_name = Set(Some(file.original_name.clone()));
    let entry = match entry.insert(db).await {
        Ok(entry) => entry,
        Err(error) => {
            discard_upload(storage, &file).await;
            return Err(error.into());
        }
    };

    tracing::info!(task_id = %id, file = ?entry.file_name, "Attachment added");
    Ok(entry)
}

/// Delete a task and its history. Sub-tasks are kept and detached.
pub async fn delete_task(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;

    task::Entity::update_many()
        .col_expr(task::Column::ParentId, Expr::value(Option::<String>::None))
        .filter(task::Column::ParentId.eq(id))
        .exec(&txn)
        .await?;

    task_history::Entity::delete_many()
        .filter(task_history::Column::TaskId.eq(id))
        .exec(&txn)
        .await?;

    let result = task::Entity::delete_by_id(id.to_string()).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Task not found".to_string()));
    }

    txn.commit().await?;

    tracing::info!(task_id = %id, "Task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        id: i64,
        user: &str,
        text: &str,
        action: Option<&str>,
        target: Option<&str>,
    ) -> task_history::Model {
        task_history::Model {
            id,
            task_id: "T".to_string(),
            user: user.to_string(),
            text: text.to_string(),
            kind: KIND_MESSAGE.to_string(),
            action: action.map(str::to_string),
            target_user: target.map(str::to_string),
            file_url: None,
            file_name: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn view(
        responsible: &str,
        status: &str,
        history: Vec<task_history::Model>,
        op: &str,
        creator_op: &str,
    ) -> TaskView {
        let now = chrono::Utc::now();
        TaskView {
            task: task::Model {
                id: "T".to_string(),
                title: "Conferir caixa".to_string(),
                responsible: responsible.to_string(),
                status: status.to_string(),
                priority: "Alta".to_string(),
                deadline: "2026-01-31".to_string(),
                source: "Rotina".to_string(),
                parent_id: None,
                created_at: now,
                updated_at: now,
            },
            history,
            operation: op.to_string(),
            creator_operation: creator_op.to_string(),
        }
    }

    fn viewer(name: &str, operation: &str, sees_everything: bool) -> Viewer {
        Viewer {
            name: name.to_string(),
            operation: operation.to_string(),
            sees_everything,
        }
    }

    #[test]
    fn test_previous_holder_prefers_latest_pass_to_current_holder() {
        let history = vec![
            entry(1, "Ana", FLOW_STARTED, None, None),
            entry(2, "Ana", "Passed to Bruno", Some("pass"), Some("Bruno")),
            entry(3, "Bruno", "Passed to Carla", Some("pass"), Some("Carla")),
            entry(4, "Diego", "Passed to Carla", Some("pass"), Some("Carla")),
        ];
        assert_eq!(previous_holder(&history, "Carla"), Some("Diego"));
        assert_eq!(previous_holder(&history, "Bruno"), Some("Ana"));
    }

    #[test]
    fn test_previous_holder_falls_back_to_creator() {
        let history = vec![entry(1, "Ana", FLOW_STARTED, None, None)];
        assert_eq!(previous_holder(&history, "Bruno"), Some("Ana"));
        assert_eq!(previous_holder(&[], "Bruno"), None);
    }

    #[test]
    fn test_visibility_through_operation_and_participation() {
        let history = vec![
            entry(1, "Ana", FLOW_STARTED, None, None),
            entry(2, "Eva", "ok", None, None),
        ];
        let task = view("Bruno", "pending", history, "Financeiro", "Varejo");

        assert!(is_visible(&viewer("Bruno", "X", false), &task, "general"));
        assert!(is_visible(&viewer("Eva", "X", false), &task, "general"));
        assert!(is_visible(&viewer("Fabio", "Financeiro", false), &task, "general"));
        assert!(is_visible(&viewer("Gil", "Varejo", false), &task, "general"));
        assert!(!is_visible(&viewer("Hugo", "Logistica", false), &task, "general"));
        assert!(is_visible(&viewer("Root", "Logistica", true), &task, "general"));
    }

    #[test]
    fn test_mine_modes_only_show_held_or_created() {
        let history = vec![
            entry(1, "Ana", FLOW_STARTED, None, None),
            entry(2, "Eva", "ok", None, None),
        ];
        let task = view("Bruno", "pending", history, "Financeiro", "Financeiro");

        assert!(is_visible(&viewer("Bruno", "X", false), &task, "mine_pending"));
        assert!(is_visible(&viewer("Ana", "X", false), &task, "mine_pending"));
        assert!(!is_visible(&viewer("Eva", "Financeiro", false), &task, "mine_pending"));
    }

    #[test]
    fn test_admins_see_every_task_in_mine_modes() {
        let history = vec![entry(1, "Ana", FLOW_STARTED, None, None)];
        let task = view("Bruno", "pending", history, "Financeiro", "Financeiro");

        assert!(is_visible(&viewer("Root", "X", true), &task, "mine_pending"));
        assert!(is_visible(&viewer("Root", "X", true), &task, "mine_all"));
    }

    #[test]
    fn test_matches_status() {
        assert!(matches_status("all", "done"));
        assert!(matches_status("completed", "pending"));
        assert!(matches_status("mine_pending", "pending"));
        assert!(!matches_status("mine_pending", "doing"));
        assert!(matches_status("general_doing", "doing"));
        assert!(matches_status("history_done", "done"));
        assert!(matches_status("general", "doing"));
        assert!(!matches_status("general", "done"));
    }
}
