//! Stock ledger rules
//!
//! The ledger is append-only: every change to a product's on-hand count is
//! recorded as one `StockLevel` entry whose `quantity_change` is the delta
//! applied. These functions decide what to write; the backend writes the
//! product and the entry in one transaction.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{ChangeType, Product, StockLevel, StockLevelDraft};

/// Reasons a stock mutation is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient stock: {available} on hand, change of {delta} requested")]
    InsufficientStock { available: i32, delta: i32 },

    #[error("Stock quantity cannot be negative")]
    NegativeQuantity,

    #[error("Stock quantity out of range")]
    Overflow,
}

/// A validated stock change: the product's new count and the entry recording it
#[derive(Debug, Clone, PartialEq)]
pub struct StockMutation {
    pub new_quantity: i32,
    pub entry: StockLevelDraft,
}

/// Entry recording a new product's starting count
pub fn initial_stock(product: &Product, now: DateTime<Utc>) -> Result<StockLevelDraft, LedgerError> {
    if product.stock_quantity < 0 {
        return Err(LedgerError::NegativeQuantity);
    }
    Ok(StockLevelDraft {
        product_id: product.id,
        quantity_change: product.stock_quantity,
        change_date: now,
        change_type: ChangeType::InitialStock,
    })
}

/// Apply a signed delta to the product's current count
///
/// Fails without producing anything when the result would be negative.
/// A zero delta is a no-op and yields `None`.
pub fn apply_delta(
    product: &Product,
    delta: i32,
    change_type: ChangeType,
    now: DateTime<Utc>,
) -> Result<Option<StockMutation>, LedgerError> {
    if delta == 0 {
        return Ok(None);
    }

    let new_quantity = product
        .stock_quantity
        .checked_add(delta)
        .ok_or(LedgerError::Overflow)?;

    if new_quantity < 0 {
        return Err(LedgerError::InsufficientStock {
            available: product.stock_quantity,
            delta,
        });
    }

    Ok(Some(StockMutation {
        new_quantity,
        entry: StockLevelDraft {
            product_id: product.id,
            quantity_change: delta,
            change_date: now,
            change_type,
        },
    }))
}

/// Entry for an edit that replaced the count `old_quantity` with `new_quantity`
///
/// Returns `None` when the count did not move; a zero change is not logged.
pub fn edit_adjustment(
    product_id: i64,
    old_quantity: i32,
    new_quantity: i32,
    now: DateTime<Utc>,
) -> Result<Option<StockLevelDraft>, LedgerError> {
    if new_quantity < 0 {
        return Err(LedgerError::NegativeQuantity);
    }
    let delta = new_quantity
        .checked_sub(old_quantity)
        .ok_or(LedgerError::Overflow)?;

    Ok(ChangeType::for_delta(delta).map(|change_type| StockLevelDraft {
        product_id,
        quantity_change: delta,
        change_date: now,
        change_type,
    }))
}

/// Signed delta for an explicit add/remove of `quantity` units
pub fn signed_quantity(quantity: i32, change_type: &ChangeType) -> Option<i32> {
    match change_type {
        ChangeType::Add => Some(quantity),
        ChangeType::Remove => quantity.checked_neg(),
        _ => None,
    }
}

/// Count implied by a product's ledger history
pub fn ledger_balance(product_id: i64, entries: &[StockLevel]) -> i64 {
    entries
        .iter()
        .filter(|e| e.product_id == product_id)
        .map(|e| i64::from(e.quantity_change))
        .sum()
}

/// Whether the cached count agrees with the ledger
pub fn is_consistent(product: &Product, entries: &[StockLevel]) -> bool {
    i64::from(product.stock_quantity) == ledger_balance(product.id, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(id: i64, qty: i32) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            description: None,
            price: Decimal::ONE,
            stock_quantity: qty,
            low_stock_threshold: 5,
            category_id: None,
            supplier_id: None,
            image: None,
            created_by: "admin".to_string(),
            created_date: Utc::now(),
        }
    }

    #[test]
    fn test_initial_stock_entry() {
        let now = Utc::now();
        let entry = initial_stock(&product(7, 12), now).unwrap();
        assert_eq!(entry.product_id, 7);
        assert_eq!(entry.quantity_change, 12);
        assert_eq!(entry.change_type, ChangeType::InitialStock);
        assert_eq!(entry.change_date, now);
    }

    #[test]
    fn test_initial_stock_rejects_negative() {
        assert_eq!(
            initial_stock(&product(1, -1), Utc::now()),
            Err(LedgerError::NegativeQuantity)
        );
    }

    #[test]
    fn test_apply_delta_to_zero_is_allowed() {
        let mutation = apply_delta(&product(1, 5), -5, ChangeType::Remove, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(mutation.new_quantity, 0);
        assert_eq!(mutation.entry.quantity_change, -5);
    }

    #[test]
    fn test_apply_delta_insufficient_stock() {
        let err = apply_delta(&product(1, 3), -4, ChangeType::Remove, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                available: 3,
                delta: -4
            }
        );
    }

    #[test]
    fn test_apply_delta_overflow() {
        let err = apply_delta(&product(1, i32::MAX), 1, ChangeType::Add, Utc::now()).unwrap_err();
        assert_eq!(err, LedgerError::Overflow);
    }

    #[test]
    fn test_apply_delta_keeps_unknown_change_type() {
        let tag = ChangeType::from("recount");
        let mutation = apply_delta(&product(1, 5), 2, tag.clone(), Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(mutation.entry.change_type, tag);
    }

    #[test]
    fn test_apply_delta_zero_is_not_logged() {
        assert_eq!(apply_delta(&product(1, 5), 0, ChangeType::Add, Utc::now()), Ok(None));
        // Even on an empty shelf
        assert_eq!(apply_delta(&product(1, 0), 0, ChangeType::Remove, Utc::now()), Ok(None));
    }

    #[test]
    fn test_edit_adjustment_zero_delta_not_logged() {
        assert_eq!(edit_adjustment(1, 8, 8, Utc::now()), Ok(None));
    }

    #[test]
    fn test_edit_adjustment_classifies_direction() {
        let up = edit_adjustment(1, 3, 10, Utc::now()).unwrap().unwrap();
        assert_eq!(up.quantity_change, 7);
        assert_eq!(up.change_type, ChangeType::Add);

        let down = edit_adjustment(1, 10, 4, Utc::now()).unwrap().unwrap();
        assert_eq!(down.quantity_change, -6);
        assert_eq!(down.change_type, ChangeType::Remove);
    }

    #[test]
    fn test_edit_adjustment_rejects_negative_quantity() {
        assert_eq!(
            edit_adjustment(1, 3, -1, Utc::now()),
            Err(LedgerError::NegativeQuantity)
        );
    }

    #[test]
    fn test_signed_quantity() {
        assert_eq!(signed_quantity(4, &ChangeType::Add), Some(4));
        assert_eq!(signed_quantity(4, &ChangeType::Remove), Some(-4));
        assert_eq!(signed_quantity(4, &ChangeType::InitialStock), None);
    }
}
