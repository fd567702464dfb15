//! Category handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::CategoryService;
use crate::AppState;
use shared::models::{Category, CategoryInput};

pub async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db.clone());
    Ok(Json(service.list().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(category_id): Path<i64>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db.clone());
    Ok(Json(service.get(category_id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let service = CategoryService::new(state.db.clone());
    let category = service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(category_id): Path<i64>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db.clone());
    Ok(Json(service.update(category_id, input).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(category_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = CategoryService::new(state.db.clone());
    service.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
