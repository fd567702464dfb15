//! Dashboard handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;
use shared::reporting::DashboardSummary;

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<DashboardSummary>> {
    let service = ReportingService::new(state.db.clone());
    Ok(Json(service.dashboard().await?))
}
