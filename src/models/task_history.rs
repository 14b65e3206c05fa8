use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const KIND_SYSTEM: &str = "system";
pub const KIND_MESSAGE: &str = "message";
pub const KIND_FILE: &str = "file";

/// Append-only log entry attached to a task
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "task_history")]
#[serde(rename_all = "camelCase")]
#[schema(as = TaskHistory)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: String,
    pub user: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Lifecycle action that produced the entry, when there was one
    pub action: Option<String>,
    pub target_user: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    #[serde(rename = "date")]
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Task,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
