//! Administration handlers, all restricted to Administrators

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AdminUser;
use crate::services::AdminService;
use crate::AppState;
use shared::models::{NewRole, NewUser, Role, UpdateUserRoles, UserRoles, UserWithRoles};

/// Response for list of roles
#[derive(Serialize)]
pub struct RolesResponse {
    pub roles: Vec<Role>,
}

/// Response for list of users
#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserWithRoles>,
}

pub async fn list_roles(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<RolesResponse>> {
    let service = AdminService::new(state.db.clone());
    let roles = service.list_roles().await?;
    Ok(Json(RolesResponse { roles }))
}

pub async fn create_role(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<NewRole>,
) -> AppResult<(StatusCode, Json<Role>)> {
    let service = AdminService::new(state.db.clone());
    let role = service.create_role(input).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<UsersResponse>> {
    let service = AdminService::new(state.db.clone());
    let users = service.list_users().await?;
    Ok(Json(UsersResponse { users }))
}

/// Register a user account
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<NewUser>,
) -> AppResult<(StatusCode, Json<UserWithRoles>)> {
    let service = AdminService::new(state.db.clone());
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user_roles(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserRoles>> {
    let service = AdminService::new(state.db.clone());
    Ok(Json(service.user_roles(user_id).await?))
}

pub async fn update_user_roles(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserRoles>,
) -> AppResult<Json<UserRoles>> {
    let service = AdminService::new(state.db.clone());
    Ok(Json(service.update_user_roles(user_id, &input.selected()).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if admin.user_id == user_id {
        return Err(AppError::Conflict {
            resource: "user".to_string(),
            message: "You cannot delete your own account".to_string(),
        });
    }

    let service = AdminService::new(state.db.clone());
    service.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
