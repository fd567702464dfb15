//! Report aggregation over in-memory snapshots
//!
//! Each report is a pure function over rows already loaded from the store.
//! Nothing here mutates its input or fails; data-access errors are the
//! caller's concern.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    Category, ChangeType, Product, ProductDetails, StockLevel, Supplier,
};
use crate::types::{Include, ProductFilter};

/// Number of products shown as recently added on the dashboard
pub const RECENTLY_ADDED_LIMIT: usize = 4;

/// Dashboard aggregate
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub products: Vec<ProductDetails>,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub total_suppliers: usize,
    pub recently_added: Vec<ProductDetails>,
}

/// Latest removal recorded against a product
#[derive(Debug, Clone, Serialize)]
pub struct RemovedProductReportRow {
    pub product: ProductDetails,
    pub quantity_changed: i32,
}

/// Flat form of `RemovedProductReportRow` for CSV export
#[derive(Debug, Clone, Serialize)]
pub struct RemovedProductCsvRow {
    pub product_id: i64,
    pub product_name: String,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    pub stock_quantity: i32,
    pub quantity_changed: i32,
}

/// Product line in the supplier report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierProductRow {
    pub product_id: i64,
    pub product_name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub quantity: i32,
    pub category_name: Option<String>,
}

/// A supplier with every product it supplies
#[derive(Debug, Clone, Serialize)]
pub struct SupplierReportRow {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub products: Vec<SupplierProductRow>,
}

/// Flat form of the supplier report for CSV export, one line per product
#[derive(Debug, Clone, Serialize)]
pub struct SupplierProductCsvRow {
    pub supplier_name: String,
    pub product_id: i64,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category_name: Option<String>,
}

/// A ledger entry with its product resolved at report time
#[derive(Debug, Clone, Serialize)]
pub struct StockReportRow {
    pub id: i64,
    pub product_id: i64,
    pub quantity_change: i32,
    pub change_date: DateTime<Utc>,
    pub change_type: ChangeType,
    /// `None` once the product has been deleted
    pub product_name: Option<String>,
    pub product_image: Option<String>,
}

/// Attach the requested relations to each product
///
/// A reference to a missing category or supplier resolves to `None`.
pub fn attach_relations(
    products: Vec<Product>,
    categories: &[Category],
    suppliers: &[Supplier],
    includes: &[Include],
) -> Vec<ProductDetails> {
    let categories: HashMap<i64, &Category> = if includes.contains(&Include::Category) {
        categories.iter().map(|c| (c.id, c)).collect()
    } else {
        HashMap::new()
    };
    let suppliers: HashMap<i64, &Supplier> = if includes.contains(&Include::Supplier) {
        suppliers.iter().map(|s| (s.id, s)).collect()
    } else {
        HashMap::new()
    };

    products
        .into_iter()
        .map(|product| ProductDetails {
            category: product
                .category_id
                .and_then(|id| categories.get(&id))
                .map(|c| (*c).clone()),
            supplier: product
                .supplier_id
                .and_then(|id| suppliers.get(&id))
                .map(|s| (*s).clone()),
            product,
        })
        .collect()
}

/// Apply a listing criterion
pub fn filter_products(products: Vec<ProductDetails>, filter: ProductFilter) -> Vec<ProductDetails> {
    match filter {
        ProductFilter::All => products,
        ProductFilter::LowStock => products
            .into_iter()
            .filter(|p| p.product.is_low_stock())
            .collect(),
        ProductFilter::OutOfStock => products
            .into_iter()
            .filter(|p| p.product.is_out_of_stock())
            .collect(),
    }
}

/// Newest products first; equal timestamps keep ascending id order
pub fn recently_added(products: &[ProductDetails], limit: usize) -> Vec<ProductDetails> {
    let mut sorted: Vec<&ProductDetails> = products.iter().collect();
    sorted.sort_by(|a, b| {
        b.product
            .created_date
            .cmp(&a.product.created_date)
            .then(a.product.id.cmp(&b.product.id))
    });
    sorted.into_iter().take(limit).cloned().collect()
}

/// Build the dashboard from the full product set
pub fn dashboard_summary(products: Vec<ProductDetails>, total_suppliers: usize) -> DashboardSummary {
    let low_stock_products = products.iter().filter(|p| p.product.is_low_stock()).count();
    let out_of_stock_products = products
        .iter()
        .filter(|p| p.product.is_out_of_stock())
        .count();
    let recently_added = recently_added(&products, RECENTLY_ADDED_LIMIT);

    DashboardSummary {
        products,
        low_stock_products,
        out_of_stock_products,
        total_suppliers,
        recently_added,
    }
}

/// Most recent removal per product
///
/// Only entries tagged exactly "remove" with a negative change count. The
/// latest `change_date` wins; on equal dates the higher entry id wins.
pub fn latest_removals(ledger: &[StockLevel]) -> HashMap<i64, &StockLevel> {
    let mut latest: HashMap<i64, &StockLevel> = HashMap::new();
    for entry in ledger
        .iter()
        .filter(|e| e.change_type == ChangeType::Remove && e.quantity_change < 0)
    {
        latest
            .entry(entry.product_id)
            .and_modify(|current| {
                if (entry.change_date, entry.id) > (current.change_date, current.id) {
                    *current = entry;
                }
            })
            .or_insert(entry);
    }
    latest
}

/// Products joined with their latest removal, in product order
pub fn removal_report(
    products: &[ProductDetails],
    ledger: &[StockLevel],
) -> Vec<RemovedProductReportRow> {
    let removals = latest_removals(ledger);
    products
        .iter()
        .filter_map(|p| {
            removals.get(&p.product.id).map(|entry| RemovedProductReportRow {
                product: p.clone(),
                quantity_changed: entry.quantity_change,
            })
        })
        .collect()
}

/// Every supplier with its products, in supplier order
pub fn supplier_report(
    suppliers: &[Supplier],
    products: &[Product],
    categories: &[Category],
) -> Vec<SupplierReportRow> {
    let category_names: HashMap<i64, &str> =
        categories.iter().map(|c| (c.id, c.name.as_str())).collect();

    suppliers
        .iter()
        .map(|supplier| SupplierReportRow {
            supplier_id: supplier.id,
            supplier_name: supplier.name.clone(),
            products: products
                .iter()
                .filter(|p| p.supplier_id == Some(supplier.id))
                .map(|p| SupplierProductRow {
                    product_id: p.id,
                    product_name: p.name.clone(),
                    price: p.price,
                    image: p.image.clone(),
                    quantity: p.stock_quantity,
                    category_name: p
                        .category_id
                        .and_then(|id| category_names.get(&id))
                        .map(|name| name.to_string()),
                })
                .collect(),
        })
        .collect()
}

/// The full ledger with product names and images resolved
pub fn stock_report(ledger: &[StockLevel], products: &[Product]) -> Vec<StockReportRow> {
    let by_id: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    ledger
        .iter()
        .map(|entry| {
            let product = by_id.get(&entry.product_id);
            StockReportRow {
                id: entry.id,
                product_id: entry.product_id,
                quantity_change: entry.quantity_change,
                change_date: entry.change_date,
                change_type: entry.change_type.clone(),
                product_name: product.map(|p| p.name.clone()),
                product_image: product.and_then(|p| p.image.clone()),
            }
        })
        .collect()
}

impl From<&RemovedProductReportRow> for RemovedProductCsvRow {
    fn from(row: &RemovedProductReportRow) -> Self {
        Self {
            product_id: row.product.product.id,
            product_name: row.product.product.name.clone(),
            category_name: row.product.category.as_ref().map(|c| c.name.clone()),
            supplier_name: row.product.supplier.as_ref().map(|s| s.name.clone()),
            stock_quantity: row.product.product.stock_quantity,
            quantity_changed: row.quantity_changed,
        }
    }
}

/// Flatten the supplier report to one line per product
pub fn supplier_csv_rows(report: &[SupplierReportRow]) -> Vec<SupplierProductCsvRow> {
    report
        .iter()
        .flat_map(|supplier| {
            supplier.products.iter().map(move |p| SupplierProductCsvRow {
                supplier_name: supplier.supplier_name.clone(),
                product_id: p.product_id,
                product_name: p.product_name.clone(),
                price: p.price,
                quantity: p.quantity,
                category_name: p.category_name.clone(),
            })
        })
        .collect()
}
