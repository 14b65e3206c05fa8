use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Roles that grant unrestricted access regardless of `is_admin`
pub const SUPER_ROLES: &[&str] = &["CEO", "DIRETOR", "ADM", "ADMIN", "SÓCIO", "MASTER"];

/// Roles treated as team leads
pub const MANAGER_ROLES: &[&str] = &["GESTOR", "GERENTE", "MANAGER", "COORDENADOR"];

/// Team-lead roles that still read sales for every store
pub const ALL_STORES_ROLES: &[&str] = &["GESTOR"];

/// Operation assigned when none is given
pub const DEFAULT_OPERATION: &str = "Outros";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash; rows migrated from the old system may still hold plaintext
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub department: String,
    pub operation: String,
    pub is_admin: bool,
    pub manager_id: Option<String>,
    pub allowed_stores: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
    #[sea_orm(has_many = "super::agenda_event::Entity")]
    AgendaEvents,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::agenda_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgendaEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Hierarchical access level derived from the free-text role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Staff,
    Manager,
    Admin,
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status != STATUS_INACTIVE
    }

    /// Admin flag or one of the executive roles
    pub fn is_super_user(&self) -> bool {
        self.is_admin || SUPER_ROLES.contains(&self.role.trim().to_uppercase().as_str())
    }

    /// Super users and the roles in [`ALL_STORES_ROLES`] read every store's sales
    pub fn sees_all_stores(&self) -> bool {
        self.is_super_user()
            || ALL_STORES_ROLES.contains(&self.role.trim().to_uppercase().as_str())
    }

    pub fn access_level(&self) -> AccessLevel {
        if self.is_super_user() {
            AccessLevel::Admin
        } else if MANAGER_ROLES.contains(&self.role.trim().to_uppercase().as_str()) {
            AccessLevel::Manager
        } else {
            AccessLevel::Staff
        }
    }

    /// Store names from the comma-separated `allowed_stores` column
    pub fn store_list(&self) -> Vec<String> {
        self.allowed_stores
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
