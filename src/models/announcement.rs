use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIORITY: &str = "Normal";
pub const DEFAULT_CATEGORY: &str = "Aviso";

/// Notice on the home board
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "announcements")]
#[serde(rename_all = "camelCase")]
#[schema(as = Announcement)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub priority: String,
    /// Board section, e.g. "Aviso", "Dica" or "Agenda"
    pub category: String,
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
