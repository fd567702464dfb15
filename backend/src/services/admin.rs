//! Administration service for roles and user accounts

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::auth::{hash_password, roles_of};
use shared::models::{NewRole, NewUser, Role, SelectedRole, User, UserRoles, UserWithRoles};

/// Role and user administration
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
}

impl AdminService {
    /// Create a new AdminService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all roles
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;

        Ok(roles)
    }

    /// Create a role with a unique name
    pub async fn create_role(&self, input: NewRole) -> AppResult<Role> {
        input.validate()?;
        let name = input.name.trim();

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles WHERE name = $1")
                .bind(name)
                .fetch_one(&self.db)
                .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created role {}", role.name);
        Ok(role)
    }

    /// Get all users with their role names
    pub async fn list_users(&self) -> AppResult<Vec<UserWithRoles>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, user_name, email, phone, created_at FROM users ORDER BY user_name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        let assignments = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT ur.user_id, r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            ORDER BY r.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let roles = assignments
                    .iter()
                    .filter(|(user_id, _)| *user_id == user.id)
                    .map(|(_, name)| name.clone())
                    .collect();
                UserWithRoles { user, roles }
            })
            .collect())
    }

    /// Register a user account, optionally with roles
    pub async fn create_user(&self, input: NewUser) -> AppResult<UserWithRoles> {
        input.validate()?;
        let user_name = input.user_name.trim();
        let email = input.email.trim();

        let taken = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM users WHERE user_name = $1),
                EXISTS (SELECT 1 FROM users WHERE email = $2)
            "#,
        )
        .bind(user_name)
        .bind(email)
        .fetch_one(&self.db)
        .await?;

        match taken {
            (true, _) => return Err(AppError::DuplicateEntry("user_name".to_string())),
            (_, true) => return Err(AppError::DuplicateEntry("email".to_string())),
            _ => {}
        }

        let password_hash = hash_password(&input.password)?;
        let role_names = input.roles.unwrap_or_default();

        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_name, email, phone, created_at
            "#,
        )
        .bind(user_name)
        .bind(email)
        .bind(&input.phone)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let assigned = assign_roles(&mut tx, user.id, &role_names).await?;

        tx.commit().await?;

        tracing::info!("Created user {}", user.user_name);
        Ok(UserWithRoles {
            user,
            roles: assigned,
        })
    }

    /// Every role, marked with whether the user holds it
    pub async fn user_roles(&self, user_id: Uuid) -> AppResult<UserRoles> {
        let user = self.get_user(user_id).await?;
        let held = roles_of(&self.db, user_id).await?;
        let roles = self
            .list_roles()
            .await?
            .into_iter()
            .map(|role| SelectedRole {
                is_selected: held.contains(&role.name),
                role_name: role.name,
            })
            .collect();

        Ok(UserRoles {
            user_id: user.id,
            user_name: user.user_name,
            email: user.email,
            phone: user.phone,
            roles,
        })
    }

    /// Replace a user's roles with `role_names`
    pub async fn update_user_roles(
        &self,
        user_id: Uuid,
        role_names: &[String],
    ) -> AppResult<UserRoles> {
        self.get_user(user_id).await?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        assign_roles(&mut tx, user_id, role_names).await?;

        tx.commit().await?;

        tracing::info!("Updated roles of user {}: {:?}", user_id, role_names);
        self.user_roles(user_id).await
    }

    /// Delete a user account; its role links and sessions go with it
    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!("Deleted user {}", user_id);
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, user_name, email, phone, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}

/// Link a user to the named roles; every name must exist
async fn assign_roles(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    role_names: &[String],
) -> AppResult<Vec<String>> {
    if role_names.is_empty() {
        return Ok(Vec::new());
    }

    let roles = sqlx::query_as::<_, Role>(
        "SELECT id, name FROM roles WHERE name = ANY($1) ORDER BY name",
    )
    .bind(role_names)
    .fetch_all(&mut **tx)
    .await?;

    if let Some(unknown) = role_names
        .iter()
        .find(|name| !roles.iter().any(|r| &r.name == *name))
    {
        return Err(AppError::validation(
            "roles",
            format!("Role '{}' does not exist", unknown),
        ));
    }

    for role in &roles {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role.id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(roles.into_iter().map(|r| r.name).collect())
}
