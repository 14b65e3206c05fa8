//! Home board announcements and department bulletins

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::announcement::{DEFAULT_CATEGORY, DEFAULT_PRIORITY};
use crate::models::{announcement, dept_message};

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    pub priority: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDeptMessage {
    #[serde(default)]
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

// ============================================================================
// Announcements
// ============================================================================

/// Every announcement, newest first
pub async fn list_announcements(db: &DatabaseConnection) -> Result<Vec<announcement::Model>> {
    Ok(announcement::Entity::find()
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .all(db)
        .await?)
}

pub async fn create_announcement(
    db: &DatabaseConnection,
    mut new: NewAnnouncement,
) -> Result<announcement::Model> {
    new.title = new.title.trim().to_string();
    new.content = new.content.trim().to_string();
    new.author = new.author.trim().to_string();
    new.validate()?;

    let created = announcement::ActiveModel {
        title: Set(new.title),
        content: Set(new.content),
        author: Set(new.author),
        priority: Set(or_default(new.priority, DEFAULT_PRIORITY)),
        category: Set(or_default(new.category, DEFAULT_CATEGORY)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        announcement_id = created.id,
        category = %created.category,
        "Announcement published"
    );
    Ok(created)
}

pub async fn delete_announcement(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = announcement::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Announcement not found".to_string()));
    }
    tracing::info!(announcement_id = id, "Announcement removed");
    Ok(())
}

// ============================================================================
// Department bulletins
// ============================================================================

/// Messages of one department in the order they were posted
pub async fn list_dept_messages(
    db: &DatabaseConnection,
    department: &str,
) -> Result<Vec<dept_message::Model>> {
    Ok(dept_message::Entity::find()
        .filter(dept_message::Column::Department.eq(department.trim()))
        .order_by_asc(dept_message::Column::CreatedAt)
        .order_by_asc(dept_message::Column::Id)
        .all(db)
        .await?)
}

pub async fn post_dept_message(
    db: &DatabaseConnection,
    mut new: NewDeptMessage,
) -> Result<dept_message::Model> {
    new.department = new.department.trim().to_string();
    new.author = new.author.trim().to_string();
    new.content = new.content.trim().to_string();
    new.validate()?;

    let created = dept_message::ActiveModel {
        department: Set(new.department),
        author: Set(new.author),
        content: Set(new.content),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::debug!(department = %created.department, "Department message posted");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_optional_fields_fall_back() {
        assert_eq!(or_default(None, DEFAULT_PRIORITY), "Normal");
        assert_eq!(or_default(Some("  ".to_string()), DEFAULT_CATEGORY), "Aviso");
        assert_eq!(or_default(Some(" Dica ".to_string()), DEFAULT_CATEGORY), "Dica");
    }

    #[test]
    fn test_new_announcement_requires_text() {
        let new = NewAnnouncement {
            title: "Inventario".to_string(),
            content: String::new(),
            author: "Marta".to_string(),
            priority: None,
            category: None,
        };
        assert!(new.validate().is_err());
    }
}
