//! User and role models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A named role; role names are the claims carried by an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// User listing entry with role names
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<String>,
}

/// A role and whether a given user holds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRole {
    pub role_name: String,
    pub is_selected: bool,
}

/// Role assignment view for one user
#[derive(Debug, Clone, Serialize)]
pub struct UserRoles {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub roles: Vec<SelectedRole>,
}

/// Input for creating a role
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRole {
    #[validate(length(min = 1, max = 50, message = "Role name must be 1-50 characters"))]
    pub name: String,
}

/// Input for registering a user account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 3, max = 50, message = "User name must be 3-50 characters"))]
    pub user_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(custom = "crate::validation::validate_password")]
    pub password: String,
    pub roles: Option<Vec<String>>,
}

/// Input for changing the caller's own password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(custom = "crate::validation::validate_password")]
    pub new_password: String,
}

/// Input replacing a user's roles with the selected ones
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRoles {
    pub roles: Vec<SelectedRole>,
}

impl UpdateUserRoles {
    pub fn selected(&self) -> Vec<String> {
        self.roles
            .iter()
            .filter(|r| r.is_selected)
            .map(|r| r.role_name.clone())
            .collect()
    }
}
