use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::user::{self, AccessLevel, DEFAULT_OPERATION, STATUS_ACTIVE, STATUS_INACTIVE};
use crate::services::security::{hash_password, verify_password};

/// Store list sent either as an array or as one comma-separated string
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum StoreList {
    Many(Vec<String>),
    Joined(String),
}

impl StoreList {
    /// Comma-joined form kept in the `allowed_stores` column
    pub fn joined(&self) -> String {
        let stores: Vec<&str> = match self {
            StoreList::Many(stores) => stores.iter().map(String::as_str).collect(),
            StoreList::Joined(joined) => joined.split(',').collect(),
        };
        stores
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    pub operation: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub manager_id: Option<String>,
    pub allowed_stores: Option<StoreList>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub operation: Option<String>,
    pub is_admin: Option<bool>,
    pub manager_id: Option<String>,
    /// Re-hashed only when not blank
    pub password: Option<String>,
    pub allowed_stores: Option<StoreList>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserRef {
    pub id: String,
    pub name: String,
}

impl From<&user::Model> for UserRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

/// User as returned by the API; never carries the password
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub operation: String,
    pub is_admin: bool,
    pub manager_id: Option<String>,
    pub allowed_stores: String,
    pub status: String,
    #[schema(value_type = String)]
    pub access_level: AccessLevel,
    pub manager: Option<UserRef>,
    pub staff: Vec<UserRef>,
    #[schema(value_type = String)]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[schema(value_type = String)]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserResponse {
    pub fn from_user(
        user: user::Model,
        manager: Option<&user::Model>,
        staff: &[&user::Model],
    ) -> Self {
        let access_level = if !staff.is_empty() && user.access_level() == AccessLevel::Staff {
            AccessLevel::Manager
        } else {
            user.access_level()
        };
        Self {
            access_level,
            manager: manager.map(UserRef::from),
            staff: staff.iter().map(|s| UserRef::from(*s)).collect(),
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            operation: user.operation,
            is_admin: user.is_admin,
            manager_id: user.manager_id,
            allowed_stores: user.allowed_stores,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CreatedUser {
    pub id: String,
    pub name: String,
    pub message: String,
}

fn with_relations(user: user::Model, everyone: &[user::Model]) -> UserResponse {
    let manager = user
        .manager_id
        .as_deref()
        .and_then(|id| everyone.iter().find(|u| u.id == id));
    let staff: Vec<&user::Model> = everyone
        .iter()
        .filter(|u| u.manager_id.as_deref() == Some(user.id.as_str()))
        .collect();
    UserResponse::from_user(user, manager, &staff)
}

/// All users by name, with manager and staff
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<UserResponse>> {
    let everyone = user::Entity::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await?;

    Ok(everyone
        .iter()
        .cloned()
        .map(|u| with_relations(u, &everyone))
        .collect())
}

async fn response_for(db: &DatabaseConnection, user: user::Model) -> Result<UserResponse> {
    let manager = match user.manager_id.as_deref() {
        Some(id) => user::Entity::find_by_id(id.to_string()).one(db).await?,
        None => None,
    };
    let staff = user::Entity::find()
        .filter(user::Column::ManagerId.eq(user.id.as_str()))
        .order_by_asc(user::Column::Name)
        .all(db)
        .await?;
    let staff: Vec<&user::Model> = staff.iter().collect();
    Ok(UserResponse::from_user(user, manager.as_ref(), &staff))
}

async fn ensure_email_free(
    db: &DatabaseConnection,
    email: &str,
    except: Option<&str>,
) -> Result<()> {
    let mut query = user::Entity::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(user::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    Ok(())
}

async fn validate_manager(
    db: &DatabaseConnection,
    manager_id: Option<&str>,
    user_id: Option<&str>,
) -> Result<()> {
    let Some(manager_id) = manager_id else {
        return Ok(());
    };
    if Some(manager_id) == user_id {
        return Err(AppError::BadRequest("A user cannot manage themselves".to_string()));
    }
    if user::Entity::find_by_id(manager_id.to_string()).one(db).await?.is_none() {
        return Err(AppError::BadRequest("Manager not found".to_string()));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn create_user(
    db: &DatabaseConnection,
    mut request: CreateUserRequest,
) -> Result<CreatedUser> {
    request.email = request.email.trim().to_string();
    request.name = request.name.trim().to_string();
    request.validate()?;

    let email = request.email.clone();
    ensure_email_free(db, &email, None).await?;

    let manager_id = non_blank(request.manager_id);
    validate_manager(db, manager_id.as_deref(), None).await?;

    let now = chrono::Utc::now();
    let id = uuid::Uuid::new_v4().to_string();
    let name = request.name.clone();

    user::ActiveModel {
        id: Set(id.clone()),
        name: Set(name.clone()),
        email: Set(email),
        password: Set(hash_password(&request.password)?),
        role: Set(request.role.trim().to_string()),
        department: Set(request.department.trim().to_string()),
        operation: Set(
            non_blank(request.operation).unwrap_or_else(|| DEFAULT_OPERATION.to_string()),
        ),
        is_admin: Set(request.is_admin),
        manager_id: Set(manager_id),
        allowed_stores: Set(request.allowed_stores.map(|s| s.joined()).unwrap_or_default()),
        status: Set(STATUS_ACTIVE.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = %id, name = %name, "User created");
    Ok(CreatedUser {
        id,
        name,
        message: "User created".to_string(),
    })
}

pub async fn update_user(
    db: &DatabaseConnection,
    id: &str,
    mut request: UpdateUserRequest,
) -> Result<UserResponse> {
    request.email = request.email.map(|e| e.trim().to_string());
    request.validate()?;

    let existing = user::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = existing.into();

    if let Some(name) = non_blank(request.name) {
        active.name = Set(name);
    }
    if let Some(email) = non_blank(request.email) {
        ensure_email_free(db, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(role) = request.role {
        active.role = Set(role.trim().to_string());
    }
    if let Some(department) = request.department {
        active.department = Set(department.trim().to_string());
    }
    if let Some(operation) = request.operation {
        active.operation =
            Set(non_blank(Some(operation)).unwrap_or_else(|| DEFAULT_OPERATION.to_string()));
    }
    if let Some(is_admin) = request.is_admin {
        active.is_admin = Set(is_admin);
    }
    if let Some(manager_id) = request.manager_id {
        let manager_id = non_blank(Some(manager_id));
        validate_manager(db, manager_id.as_deref(), Some(id)).await?;
        active.manager_id = Set(manager_id);
    }
    if let Some(password) = request.password.filter(|p| !p.trim().is_empty()) {
        active.password = Set(hash_password(&password)?);
    }
    if let Some(stores) = request.allowed_stores {
        active.allowed_stores = Set(stores.joined());
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(db).await?;
    tracing::info!(user_id = %id, "User updated");

    response_for(db, updated).await
}

/// Users are never removed; deactivation blocks login and keeps history intact
pub async fn deactivate_user(db: &DatabaseConnection, id: &str) -> Result<()> {
    let existing = user::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = existing.into();
    active.status = Set(STATUS_INACTIVE.to_string());
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await?;

    tracing::info!(user_id = %id, "User deactivated");
    Ok(())
}

/// Check login credentials; both values are trimmed, email match is exact
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<UserResponse> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let found = user::Entity::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password.trim(), &found.password) {
        tracing::warn!(user_id = %found.id, "Login rejected: wrong password");
        return Err(invalid());
    }
    if !found.is_active() {
        tracing::warn!(user_id = %found.id, "Login rejected: user inactive");
        return Err(AppError::Unauthorized("User is inactive".to_string()));
    }

    tracing::info!(user_id = %found.id, "User logged in");
    response_for(db, found).await
}
