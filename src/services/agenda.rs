//! Personal agenda events

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{agenda_event, user};

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAgendaEvent {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
}

/// Events of one user on one day, in creation order
pub async fn list_events(
    db: &DatabaseConnection,
    user_id: &str,
    date: &str,
) -> Result<Vec<agenda_event::Model>> {
    Ok(agenda_event::Entity::find()
        .filter(agenda_event::Column::UserId.eq(user_id))
        .filter(agenda_event::Column::Date.eq(date))
        .order_by_asc(agenda_event::Column::Id)
        .all(db)
        .await?)
}

pub async fn create_event(
    db: &DatabaseConnection,
    mut event: NewAgendaEvent,
) -> Result<agenda_event::Model> {
    event.user_id = event.user_id.trim().to_string();
    event.title = event.title.trim().to_string();
    event.date = event.date.trim().to_string();
    event.validate()?;

    if user::Entity::find_by_id(event.user_id.clone())
        .one(db)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!(
            "Unknown user: {}",
            event.user_id
        )));
    }

    let created = agenda_event::ActiveModel {
        user_id: Set(event.user_id),
        title: Set(event.title),
        date: Set(event.date),
        completed: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::debug!(event_id = created.id, user_id = %created.user_id, "Agenda event created");
    Ok(created)
}

pub async fn set_completed(
    db: &DatabaseConnection,
    id: i64,
    completed: bool,
) -> Result<agenda_event::Model> {
    let event = agenda_event::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let mut active: agenda_event::ActiveModel = event.into();
    active.completed = Set(completed);
    Ok(active.update(db).await?)
}

pub async fn delete_event(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = agenda_event::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Event not found".to_string()));
    }
    Ok(())
}
