//! Reporting service for the dashboard, reports and data export
//!
//! Loads snapshots through the repositories and hands them to the pure
//! aggregators in `shared::reporting`.

use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::repository::{PgRepository, Repository};
use shared::models::{Category, Product, StockLevel, Supplier};
use shared::reporting::{
    self, attach_relations, DashboardSummary, RemovedProductReportRow, StockReportRow,
    SupplierReportRow,
};
use shared::types::Include;

/// Read-only reporting
#[derive(Clone)]
pub struct ReportingService {
    products: PgRepository<Product>,
    categories: PgRepository<Category>,
    suppliers: PgRepository<Supplier>,
    entries: PgRepository<StockLevel>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self {
            products: PgRepository::new(db.clone()),
            categories: PgRepository::new(db.clone()),
            suppliers: PgRepository::new(db.clone()),
            entries: PgRepository::new(db),
        }
    }

    /// Stock counts, supplier total and the newest products
    pub async fn dashboard(&self) -> AppResult<DashboardSummary> {
        let products = self.products.get_all(None).await?;
        let categories = self.categories.get_all(None).await?;
        let suppliers = self.suppliers.get_all(None).await?;

        let products = attach_relations(products, &categories, &[], &[Include::Category]);
        Ok(reporting::dashboard_summary(products, suppliers.len()))
    }

    /// Each product's most recent removal
    pub async fn removal_report(&self) -> AppResult<Vec<RemovedProductReportRow>> {
        let products = self.products.get_all(None).await?;
        let categories = self.categories.get_all(None).await?;
        let suppliers = self.suppliers.get_all(None).await?;
        let ledger = self.entries.get_all(None).await?;

        let products = attach_relations(products, &categories, &suppliers, &Include::ALL);
        Ok(reporting::removal_report(&products, &ledger))
    }

    /// Every supplier with the products it supplies
    pub async fn supplier_report(&self) -> AppResult<Vec<SupplierReportRow>> {
        let suppliers = self.suppliers.get_all(None).await?;
        let products = self.products.get_all(None).await?;
        let categories = self.categories.get_all(None).await?;

        Ok(reporting::supplier_report(&suppliers, &products, &categories))
    }

    /// The whole stock ledger, products resolved where they still exist
    pub async fn stock_report(&self) -> AppResult<Vec<StockReportRow>> {
        let ledger = self.entries.get_all(None).await?;
        let products = self.products.get_all(None).await?;

        Ok(reporting::stock_report(&ledger, &products))
    }

    /// Export report data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
