//! Supplier handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::error::AppResult;
use crate::handlers::{report_response, ReportQuery};
use crate::middleware::{AdminUser, CurrentUser};
use crate::services::{ReportingService, SupplierService};
use crate::AppState;
use shared::models::{Supplier, SupplierInput};
use shared::reporting::supplier_csv_rows;

pub async fn list_suppliers(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.db.clone());
    Ok(Json(service.list().await?))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(supplier_id): Path<i64>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.db.clone());
    Ok(Json(service.get(supplier_id).await?))
}

/// Create a supplier (Administrator)
pub async fn create_supplier(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let service = SupplierService::new(state.db.clone());
    let supplier = service.create(&admin, input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(supplier_id): Path<i64>,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.db.clone());
    Ok(Json(service.update(supplier_id, input).await?))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(supplier_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = SupplierService::new(state.db.clone());
    service.delete(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Suppliers with their products (Administrator)
pub async fn supplier_report(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let report = service.supplier_report().await?;

    report_response(&query, "supplier_products.csv", &report, supplier_csv_rows)
}
