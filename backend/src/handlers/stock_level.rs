//! Stock ledger report handler

use axum::{
    extract::{Query, State},
    response::Response,
};

use crate::error::AppResult;
use crate::handlers::{report_response, ReportQuery};
use crate::middleware::AdminUser;
use crate::services::ReportingService;
use crate::AppState;

/// Every stock movement with its product (Administrator)
pub async fn stock_report(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let rows = service.stock_report().await?;

    report_response(&query, "stock_levels.csv", &rows, |rows| rows.to_vec())
}
