//! Stock ledger service
//!
//! Stock changes lock the product row, apply the ledger rules, then write
//! the new count and the ledger entry in the same transaction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::repository::{self, PgRepository};
use shared::access::Identity;
use shared::ledger;
use shared::models::{ChangeType, Product, StockLevel};

/// Stock ledger operations
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    entries: PgRepository<StockLevel>,
}

/// Input for an explicit stock movement
#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementInput {
    pub product_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub change_type: ChangeType,
}

/// Outcome of a stock change
#[derive(Debug, Serialize)]
pub struct StockChange {
    pub product: Product,
    /// `None` when the count did not move
    pub entry: Option<StockLevel>,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self {
            entries: PgRepository::new(db.clone()),
            db,
        }
    }

    /// Add or remove `quantity` units as requested by a user
    pub async fn record_movement(
        &self,
        identity: &Identity,
        input: StockMovementInput,
    ) -> AppResult<StockChange> {
        input.validate()?;
        let delta = ledger::signed_quantity(input.quantity, &input.change_type).ok_or_else(|| {
            AppError::validation("change_type", "Change type must be 'add' or 'remove'")
        })?;

        let change = self
            .apply_delta(input.product_id, delta, input.change_type)
            .await?;

        tracing::info!(
            "{} recorded stock change {} on product {}",
            identity.name,
            delta,
            input.product_id
        );
        Ok(change)
    }

    /// Apply a signed change to a product's count
    ///
    /// Concurrent calls on one product are serialized by the row lock, so
    /// each sees the count left by the previous one. A change that would
    /// take the count below zero writes nothing.
    pub async fn apply_delta(
        &self,
        product_id: i64,
        delta: i32,
        change_type: ChangeType,
    ) -> AppResult<StockChange> {
        let mut tx = self.db.begin().await?;

        let product = repository::fetch_for_update::<Product, _>(&mut *tx, product_id).await?;
        let Some(mutation) = ledger::apply_delta(&product, delta, change_type, Utc::now())? else {
            return Ok(StockChange {
                product,
                entry: None,
            });
        };

        let mut draft = product.to_draft();
        draft.stock_quantity = mutation.new_quantity;
        let product = repository::update_in::<Product, _>(&mut *tx, product_id, &draft).await?;
        let entry = repository::insert::<StockLevel, _>(&mut *tx, &mutation.entry).await?;

        tx.commit().await?;

        Ok(StockChange {
            product,
            entry: Some(entry),
        })
    }

    /// Ledger entries of one product, oldest first
    pub async fn history(&self, product_id: i64) -> AppResult<Vec<StockLevel>> {
        self.entries.find_by("product_id", product_id).await
    }
}
