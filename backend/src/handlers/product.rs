//! Product handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{report_response, ReportQuery};
use crate::middleware::{AdminUser, CurrentUser};
use crate::services::stock::{StockChange, StockMovementInput};
use crate::services::{ProductService, ReportingService, StockService};
use crate::AppState;
use shared::models::{NewProduct, ProductDetails, ProductUpdate, StockLevel};
use shared::reporting::RemovedProductCsvRow;
use shared::types::{Include, ProductFilter};

#[derive(Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub filter: String,
}

/// List all products with category and supplier
pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<ProductDetails>>> {
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.list(&Include::ALL).await?))
}

/// List products matching `?filter=low|out`; anything else lists all
pub async fn filter_products(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Vec<ProductDetails>>> {
    let service = ProductService::new(state.db.clone());
    let filter = ProductFilter::parse(&query.filter);
    Ok(Json(service.filter(filter).await?))
}

pub async fn low_stock_products(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<ProductDetails>>> {
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.low_stock().await?))
}

pub async fn out_of_stock_products(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<ProductDetails>>> {
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.out_of_stock().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<Json<ProductDetails>> {
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.details(product_id).await?))
}

/// Create a product and record its initial stock
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<NewProduct>,
) -> AppResult<(StatusCode, Json<ProductDetails>)> {
    let service = ProductService::new(state.db.clone());
    let product = service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(product_id): Path<i64>,
    Json(input): Json<ProductUpdate>,
) -> AppResult<Json<ProductDetails>> {
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.update(product_id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db.clone());
    service.delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add or remove stock
pub async fn update_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<StockMovementInput>,
) -> AppResult<Json<StockChange>> {
    let service = StockService::new(state.db.clone());
    Ok(Json(service.record_movement(&user, input).await?))
}

/// Ledger history of one product
pub async fn product_stock_levels(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Vec<StockLevel>>> {
    let service = StockService::new(state.db.clone());
    Ok(Json(service.history(product_id).await?))
}

/// Upload a product image from the multipart field `image`
pub async fn upload_image(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(product_id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<ProductDetails>> {
    let service = ProductService::new(state.db.clone());
    // Fail before reading the upload
    service.details(product_id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::validation("image", "Image file is empty"));
        }
        if bytes.len() > state.config.storage.max_upload_bytes {
            return Err(AppError::validation("image", "Image file is too large"));
        }

        let reference = state.storage.store("product", &file_name, &bytes).await?;
        return Ok(Json(service.set_image(product_id, reference).await?));
    }

    Err(AppError::validation("image", "Multipart field 'image' is required"))
}

/// Each product's latest removal (Administrator)
pub async fn removal_report(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let rows = service.removal_report().await?;

    report_response(&query, "removed_products.csv", &rows, |rows| {
        rows.iter().map(RemovedProductCsvRow::from).collect()
    })
}
