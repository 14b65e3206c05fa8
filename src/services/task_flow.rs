//! Task lifecycle rules
//!
//! A task moves `pending -> doing -> done`. Every accepted action yields one
//! new history entry; finishing an already finished task is the only
//! accepted action that changes nothing. `done` is left only through an
//! explicit `reopen`.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::task_history::{KIND_MESSAGE, KIND_SYSTEM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(TaskStatus::Pending),
            "doing" => Some(TaskStatus::Doing),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    StartProgress,
    Comment,
    Pass,
    Return,
    Finish,
    Reopen,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskAction::StartProgress => "start_progress",
            TaskAction::Comment => "comment",
            TaskAction::Pass => "pass",
            TaskAction::Return => "return",
            TaskAction::Finish => "finish",
            TaskAction::Reopen => "reopen",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "start_progress" => Some(TaskAction::StartProgress),
            "comment" => Some(TaskAction::Comment),
            "pass" => Some(TaskAction::Pass),
            "return" => Some(TaskAction::Return),
            "finish" => Some(TaskAction::Finish),
            "reopen" => Some(TaskAction::Reopen),
            _ => None,
        }
    }

    /// Resolve the action of an update request.
    ///
    /// Older clients send only the desired `status`, or only a comment.
    pub fn resolve(
        action: Option<&str>,
        status: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Self> {
        if let Some(action) = action.map(str::trim).filter(|a| !a.is_empty()) {
            return Self::parse(action)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown action: {}", action)));
        }

        if let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) {
            return match TaskStatus::parse(status) {
                Some(TaskStatus::Doing) => Ok(TaskAction::StartProgress),
                Some(TaskStatus::Done) => Ok(TaskAction::Finish),
                Some(TaskStatus::Pending) => Ok(TaskAction::Reopen),
                None => Err(AppError::BadRequest(format!("Unknown status: {}", status))),
            };
        }

        if comment.is_some_and(|c| !c.trim().is_empty()) {
            return Ok(TaskAction::Comment);
        }

        Err(AppError::BadRequest("actionType is required".to_string()))
    }
}

/// State of the task the action is applied to
#[derive(Debug, Clone)]
pub struct TaskSnapshot<'a> {
    pub status: TaskStatus,
    pub responsible: &'a str,
    pub title: &'a str,
    pub has_open_subtasks: bool,
    /// Whoever handed the task to its current holder, if known
    pub previous_holder: Option<&'a str>,
}

/// A requested lifecycle action
#[derive(Debug, Clone)]
pub struct ActionRequest<'a> {
    pub action: TaskAction,
    pub actor: &'a str,
    pub comment: Option<&'a str>,
    pub target: Option<&'a str>,
}

/// History entry to append for an accepted action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDraft {
    pub user: String,
    pub text: String,
    pub kind: &'static str,
    pub action: TaskAction,
    pub target_user: Option<String>,
}

/// Changes to apply for an accepted action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub status: TaskStatus,
    pub responsible: String,
    pub history: HistoryDraft,
    /// Name of the user to notify, with the message
    pub notify: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Accepted without any change (finishing a finished task)
    Unchanged,
    Apply(Transition),
}

/// Decide what an action does to a task. Pure; touches no storage.
pub fn plan(task: &TaskSnapshot<'_>, request: &ActionRequest<'_>) -> Result<Outcome> {
    let comment = request
        .comment
        .map(str::trim)
        .filter(|c| !c.is_empty());

    if task.status == TaskStatus::Done {
        match request.action {
            TaskAction::Finish => return Ok(Outcome::Unchanged),
            TaskAction::Reopen => {}
            _ => return Err(AppError::BadRequest("Task is finished".to_string())),
        }
    }

    let entry = |text: String, kind: &'static str, target: Option<&str>| HistoryDraft {
        user: request.actor.to_string(),
        text,
        kind,
        action: request.action,
        target_user: target.map(str::to_string),
    };

    let transition = match request.action {
        TaskAction::StartProgress => {
            if task.status != TaskStatus::Pending {
                return Err(AppError::BadRequest(
                    "Task is already in progress".to_string(),
                ));
            }
            Transition {
                status: TaskStatus::Doing,
                responsible: task.responsible.to_string(),
                history: entry(
                    "Started working on this task.".to_string(),
                    KIND_SYSTEM,
                    None,
                ),
                notify: None,
            }
        }
        TaskAction::Comment => {
            let text = comment
                .ok_or_else(|| AppError::BadRequest("Comment is required".to_string()))?;
            Transition {
                status: task.status,
                responsible: task.responsible.to_string(),
                history: entry(text.to_string(), KIND_MESSAGE, None),
                notify: None,
            }
        }
        TaskAction::Pass => {
            let target = request
                .target
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::BadRequest("Target user is required".to_string()))?;
            if target == task.responsible {
                return Err(AppError::BadRequest(
                    "Task is already held by that user".to_string(),
                ));
            }
            Transition {
                status: TaskStatus::Pending,
                responsible: target.to_string(),
                history: entry(
                    with_comment(format!("Passed to {}", target), comment),
                    KIND_MESSAGE,
                    Some(target),
                ),
                notify: Some((
                    target.to_string(),
                    format!("{} passed you a task: {}", request.actor, task.title),
                )),
            }
        }
        TaskAction::Return => {
            let target = request
                .target
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .or(task.previous_holder)
                .ok_or_else(|| {
                    AppError::BadRequest("No previous holder to return to".to_string())
                })?;
            if target == task.responsible {
                return Err(AppError::BadRequest(
                    "Task is already held by that user".to_string(),
                ));
            }
            Transition {
                status: TaskStatus::Pending,
                responsible: target.to_string(),
                history: entry(
                    with_comment(format!("Returned to {}", target), comment),
                    KIND_MESSAGE,
                    Some(target),
                ),
                notify: Some((
                    target.to_string(),
                    format!("{} returned a task to you: {}", request.actor, task.title),
                )),
            }
        }
        TaskAction::Finish => {
            if task.has_open_subtasks {
                return Err(AppError::BadRequest(
                    "Cannot finish: there are unfinished sub-tasks".to_string(),
                ));
            }
            Transition {
                status: TaskStatus::Done,
                responsible: task.responsible.to_string(),
                history: entry(
                    comment.unwrap_or("Finished the task.").to_string(),
                    KIND_SYSTEM,
                    None,
                ),
                notify: None,
            }
        }
        TaskAction::Reopen => {
            if task.status != TaskStatus::Done {
                return Err(AppError::BadRequest(
                    "Only finished tasks can be reopened".to_string(),
                ));
            }
            Transition {
                status: TaskStatus::Pending,
                responsible: task.responsible.to_string(),
                history: entry(
                    comment.unwrap_or("Reopened the task.").to_string(),
                    KIND_SYSTEM,
                    None,
                ),
                notify: None,
            }
        }
    };

    Ok(Outcome::Apply(transition))
}

fn with_comment(text: String, comment: Option<&str>) -> String {
    match comment {
        Some(comment) => format!("{}: {}", text, comment),
        None => text,
    }
}
