//! HTTP request handlers

pub mod admin;
pub mod auth;
pub mod category;
pub mod dashboard;
pub mod health;
pub mod product;
pub mod stock_level;
pub mod supplier;

pub use admin::*;
pub use auth::*;
pub use category::*;
pub use dashboard::*;
pub use health::*;
pub use product::*;
pub use stock_level::*;
pub use supplier::*;

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::ReportingService;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// Render a report as JSON, or as a CSV attachment when `format=csv`
///
/// `flatten` turns the report rows into one CSV record per line.
pub(crate) fn report_response<T, C, F>(
    query: &ReportQuery,
    file_name: &str,
    rows: &[T],
    flatten: F,
) -> AppResult<Response>
where
    T: Serialize,
    C: Serialize,
    F: FnOnce(&[T]) -> Vec<C>,
{
    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&flatten(rows))?;
        let disposition = format!("attachment; filename=\"{}\"", file_name);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(rows).into_response())
    }
}
