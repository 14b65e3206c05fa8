use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Message in a department's chat-style bulletin
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "dept_messages")]
#[serde(rename_all = "camelCase")]
#[schema(as = DeptMessage)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub department: String,
    pub author: String,
    pub content: String,
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
