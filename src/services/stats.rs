use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::error::Result;
use crate::models::{task, user};
use crate::services::task_flow::TaskStatus;

/// Completion figures for one team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct MemberStats {
    pub name: String,
    pub total: u64,
    pub done: u64,
    /// Percentage of tasks done, rounded
    pub efficiency: u64,
}

/// Per-member figures, most finished tasks first
pub fn summarize(members: &[String], tasks: &[task::Model]) -> Vec<MemberStats> {
    let mut report: Vec<MemberStats> = members
        .iter()
        .map(|name| {
            let held = tasks.iter().filter(|t| &t.responsible == name);
            let (total, done) = held.fold((0u64, 0u64), |(total, done), t| {
                let finished = t.status == TaskStatus::Done.as_str();
                (total + 1, done + u64::from(finished))
            });
            let efficiency = if total > 0 {
                (done as f64 / total as f64 * 100.0).round() as u64
            } else {
                0
            };
            MemberStats {
                name: name.clone(),
                total,
                done,
                efficiency,
            }
        })
        .collect();

    report.sort_by(|a, b| b.done.cmp(&a.done));
    report
}

/// Team statistics for the named user.
///
/// Admins see everyone, users with staff see their staff, anyone else
/// gets an empty report.
pub async fn manager_stats(
    db: &DatabaseConnection,
    manager_name: &str,
) -> Result<Vec<MemberStats>> {
    let Some(manager) = user::Entity::find()
        .filter(user::Column::Name.eq(manager_name))
        .one(db)
        .await?
    else {
        return Ok(Vec::new());
    };

    let members: Vec<String> = if manager.is_super_user() {
        user::Entity::find()
            .order_by_asc(user::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|u| u.name)
            .collect()
    } else {
        user::Entity::find()
            .filter(user::Column::ManagerId.eq(manager.id.as_str()))
            .order_by_asc(user::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|u| u.name)
            .collect()
    };

    if members.is_empty() {
        return Ok(Vec::new());
    }

    let tasks = task::Entity::find()
        .filter(task::Column::Responsible.is_in(members.iter().map(String::as_str)))
        .all(db)
        .await?;

    Ok(summarize(&members, &tasks))
}
