//! Product models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Category, Supplier};
use crate::validation::validate_price;

/// A stocked product
///
/// `stock_quantity` is the cached on-hand count; the stock ledger is the
/// history it is derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub category_id: Option<i64>,
    pub supplier_id: Option<i64>,
    /// Reference returned by the file store, e.g. `/img/product/<file>`
    pub image: Option<String>,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
}

impl Product {
    /// In stock, but at or below the low-stock threshold
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity > 0 && self.stock_quantity <= self.low_stock_threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == 0
    }

    /// Writable columns of this product, used to rewrite it in place
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            stock_quantity: self.stock_quantity,
            low_stock_threshold: self.low_stock_threshold,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            image: self.image.clone(),
            created_by: self.created_by.clone(),
            created_date: self.created_date,
        }
    }
}

/// Product with its category and supplier attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub supplier: Option<Supplier>,
}

impl ProductDetails {
    pub fn bare(product: Product) -> Self {
        Self {
            product,
            category: None,
            supplier: None,
        }
    }
}

/// Column values written when a product row is inserted or updated
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub category_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub image: Option<String>,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 100, message = "Product name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i32,
    #[validate(range(min = 0, message = "Low stock threshold cannot be negative"))]
    pub low_stock_threshold: i32,
    pub category_id: Option<i64>,
    pub supplier_id: Option<i64>,
}

impl NewProduct {
    pub fn into_draft(self, created_by: &str, created_date: DateTime<Utc>) -> ProductDraft {
        ProductDraft {
            name: self.name.trim().to_string(),
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            low_stock_threshold: self.low_stock_threshold,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            image: None,
            created_by: created_by.to_string(),
            created_date,
        }
    }
}

/// Input for editing a product
///
/// `stock_quantity` is the new absolute count. `old_quantity` is the count
/// the editor saw when the form was loaded; when present it must still
/// match the stored value.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 100, message = "Product name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i32,
    #[validate(range(min = 0, message = "Low stock threshold cannot be negative"))]
    pub low_stock_threshold: i32,
    pub category_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub old_quantity: Option<i32>,
}

impl ProductUpdate {
    /// Apply the edit on top of the stored product, keeping its image and
    /// creation audit fields
    pub fn apply_to(&self, current: &Product) -> ProductDraft {
        ProductDraft {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            price: self.price,
            stock_quantity: self.stock_quantity,
            low_stock_threshold: self.low_stock_threshold,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            image: current.image.clone(),
            created_by: current.created_by.clone(),
            created_date: current.created_date,
        }
    }
}
