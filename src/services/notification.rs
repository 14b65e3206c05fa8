use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::error::{AppError, Result};
use crate::models::{notification, user};

/// In-app notifications addressed to users
#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseConnection,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Store a notification for a user id.
    ///
    /// Takes any connection so callers can notify inside their transaction.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
        text: &str,
    ) -> Result<notification::Model> {
        let model = notification::ActiveModel {
            user_id: Set(user_id.to_string()),
            text: Set(text.to_string()),
            read: Set(false),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        Ok(model.insert(conn).await?)
    }

    /// Notify the user with the given display name, if one exists.
    ///
    /// Tasks reference their holder by name, so a missing user is not an error.
    pub async fn notify_by_name<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        text: &str,
    ) -> Result<Option<notification::Model>> {
        let target = user::Entity::find()
            .filter(user::Column::Name.eq(name))
            .one(conn)
            .await?;

        match target {
            Some(target) => {
                let created = Self::create(conn, &target.id, text).await?;
                tracing::debug!(user = %target.name, "Notification created");
                Ok(Some(created))
            }
            None => {
                tracing::debug!(user = %name, "No user to notify");
                Ok(None)
            }
        }
    }

    /// Unread notifications for a user, newest first
    pub async fn list_unread(&self, user_id: &str) -> Result<Vec<notification::Model>> {
        let notifications = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(&self.db)
            .await?;

        Ok(notifications)
    }

    /// Mark a notification as read
    pub async fn mark_as_read(&self, notification_id: i64, user_id: &str) -> Result<()> {
        let notification = notification::Entity::find_by_id(notification_id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        let mut active: notification::ActiveModel = notification.into();
        active.read = Set(true);
        active.update(&self.db).await?;

        Ok(())
    }

    /// Mark all notifications as read for a user, returning how many changed
    pub async fn mark_all_as_read(&self, user_id: &str) -> Result<u64> {
        let result = notification::Entity::update_many()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .col_expr(
                notification::Column::Read,
                sea_orm::sea_query::Expr::value(true),
            )
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Delete a notification
    pub async fn delete_notification(&self, notification_id: i64, user_id: &str) -> Result<()> {
        let result = notification::Entity::delete_many()
            .filter(notification::Column::Id.eq(notification_id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }
}
