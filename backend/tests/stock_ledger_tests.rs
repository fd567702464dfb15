//! Stock ledger tests
//!
//! Tests for stock accounting including:
//! - Initial stock entries on product creation
//! - Deltas that would go negative change nothing
//! - Zero-delta edits append no entry
//! - The cached count always equals the sum of the ledger

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::ledger::{self, LedgerError};
use shared::models::{ChangeType, Product, StockLevel, StockLevelDraft};

fn product(id: i64, quantity: i32) -> Product {
    Product {
        id,
        name: format!("Product {}", id),
        description: None,
        price: Decimal::new(999, 2),
        stock_quantity: quantity,
        low_stock_threshold: 5,
        category_id: None,
        supplier_id: None,
        image: None,
        created_by: "admin".to_string(),
        created_date: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
    }
}

/// Minimal in-memory store: applies the ledger rules the way the
/// backend does inside its transaction
struct Store {
    product: Product,
    entries: Vec<StockLevel>,
}

impl Store {
    fn create(quantity: i32) -> Self {
        let product = product(1, quantity);
        let initial = ledger::initial_stock(&product, product.created_date).unwrap();
        let mut store = Store {
            product,
            entries: Vec::new(),
        };
        store.append(initial);
        store
    }

    fn append(&mut self, draft: StockLevelDraft) {
        self.entries.push(StockLevel {
            id: self.entries.len() as i64 + 1,
            product_id: draft.product_id,
            quantity_change: draft.quantity_change,
            change_date: draft.change_date,
            change_type: draft.change_type,
        });
    }

    fn apply_delta(&mut self, delta: i32, change_type: ChangeType) -> Result<(), LedgerError> {
        let now = self.product.created_date + Duration::minutes(self.entries.len() as i64);
        if let Some(mutation) = ledger::apply_delta(&self.product, delta, change_type, now)? {
            self.product.stock_quantity = mutation.new_quantity;
            self.append(mutation.entry);
        }
        Ok(())
    }

    fn edit(&mut self, new_quantity: i32) -> Result<(), LedgerError> {
        let now = self.product.created_date + Duration::minutes(self.entries.len() as i64);
        let adjustment =
            ledger::edit_adjustment(self.product.id, self.product.stock_quantity, new_quantity, now)?;
        self.product.stock_quantity = new_quantity;
        if let Some(entry) = adjustment {
            self.append(entry);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Operation {
    Add(i32),
    Remove(i32),
    Edit(i32),
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (1..50i32).prop_map(Operation::Add),
        (1..50i32).prop_map(Operation::Remove),
        (0..100i32).prop_map(Operation::Edit),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_create_writes_one_initial_entry() {
        let store = Store::create(12);

        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.entries[0].change_type, ChangeType::InitialStock);
        assert_eq!(store.entries[0].quantity_change, 12);
        assert!(ledger::is_consistent(&store.product, &store.entries));
    }

    #[test]
    fn test_create_with_zero_stock_still_records_entry() {
        let store = Store::create(0);

        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.entries[0].quantity_change, 0);
    }

    #[test]
    fn test_removal_below_zero_changes_nothing() {
        let mut store = Store::create(3);
        let err = store.apply_delta(-4, ChangeType::Remove).unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                available: 3,
                delta: -4
            }
        );
        assert_eq!(store.product.stock_quantity, 3);
        assert_eq!(store.entries.len(), 1);
    }

    #[test]
    fn test_zero_delta_edit_appends_nothing() {
        let mut store = Store::create(8);
        store.edit(8).unwrap();

        assert_eq!(store.entries.len(), 1);
    }

    #[test]
    fn test_edit_records_signed_delta() {
        let mut store = Store::create(10);
        store.edit(4).unwrap();
        store.edit(9).unwrap();

        let changes: Vec<(i32, ChangeType)> = store
            .entries
            .iter()
            .map(|e| (e.quantity_change, e.change_type.clone()))
            .collect();
        assert_eq!(
            changes,
            vec![
                (10, ChangeType::InitialStock),
                (-6, ChangeType::Remove),
                (5, ChangeType::Add),
            ]
        );
        assert!(ledger::is_consistent(&store.product, &store.entries));
    }

    #[test]
    fn test_zero_delta_movement_appends_nothing() {
        let mut store = Store::create(4);
        store.apply_delta(0, ChangeType::Add).unwrap();

        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.product.stock_quantity, 4);
    }

    #[test]
    fn test_second_concurrent_removal_sees_first() {
        // Two removals of 5 against 5 on hand, serialized by the row lock
        let mut store = Store::create(5);
        let first = store.apply_delta(-5, ChangeType::Remove);
        let second = store.apply_delta(-5, ChangeType::Remove);

        assert!(first.is_ok());
        assert!(second.is_err());
        assert_eq!(store.product.stock_quantity, 0);
    }

    #[test]
    fn test_balance_ignores_other_products() {
        let mut store = Store::create(5);
        store.entries.push(StockLevel {
            id: 99,
            product_id: 2,
            quantity_change: 40,
            change_date: Utc::now(),
            change_type: ChangeType::Add,
        });

        assert_eq!(ledger::ledger_balance(1, &store.entries), 5);
        assert!(ledger::is_consistent(&store.product, &store.entries));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Whatever mix of movements is attempted, rejected ones leave no
        /// trace and the count stays equal to the ledger sum
        #[test]
        fn prop_count_equals_ledger_sum(
            initial in 0..100i32,
            operations in prop::collection::vec(operation_strategy(), 0..30)
        ) {
            let mut store = Store::create(initial);

            for operation in operations {
                let before = (store.product.stock_quantity, store.entries.len());
                let result = match operation {
                    Operation::Add(q) => store.apply_delta(q, ChangeType::Add),
                    Operation::Remove(q) => store.apply_delta(-q, ChangeType::Remove),
                    Operation::Edit(q) => store.edit(q),
                };

                if result.is_err() {
                    prop_assert_eq!((store.product.stock_quantity, store.entries.len()), before);
                }
                prop_assert!(store.product.stock_quantity >= 0);
            }

            prop_assert!(ledger::is_consistent(&store.product, &store.entries));
        }

        /// A delta is accepted exactly when the result stays non-negative,
        /// and a zero delta records nothing
        #[test]
        fn prop_delta_accepted_iff_non_negative(
            on_hand in 0..1000i32,
            delta in -1000..1000i32
        ) {
            let result = ledger::apply_delta(&product(1, on_hand), delta, ChangeType::from("adjust"), Utc::now());

            if delta == 0 {
                prop_assert_eq!(result, Ok(None));
            } else if on_hand + delta >= 0 {
                let mutation = result.unwrap().unwrap();
                prop_assert_eq!(mutation.new_quantity, on_hand + delta);
                prop_assert_eq!(mutation.entry.quantity_change, delta);
            } else {
                prop_assert!(result.is_err());
            }
        }

        /// Edits log the difference, and nothing when there is none
        #[test]
        fn prop_edit_logs_difference(old in 0..500i32, new in 0..500i32) {
            let entry = ledger::edit_adjustment(1, old, new, Utc::now()).unwrap();

            match entry {
                None => prop_assert_eq!(old, new),
                Some(entry) => {
                    prop_assert_eq!(entry.quantity_change, new - old);
                    let expected = if new > old { ChangeType::Add } else { ChangeType::Remove };
                    prop_assert_eq!(entry.change_type, expected);
                }
            }
        }
    }
}
