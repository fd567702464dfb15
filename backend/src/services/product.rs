//! Product service
//!
//! Product creation and edits that move the stock count write the ledger
//! entry in the same transaction as the product row.

use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::repository::{self, PgRepository, Repository};
use shared::access::Identity;
use shared::ledger;
use shared::models::{
    Category, NewProduct, Product, ProductDetails, ProductUpdate, StockLevel, Supplier,
};
use shared::reporting::{attach_relations, filter_products};
use shared::types::{Include, ProductFilter};

/// Product catalog operations
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
    products: PgRepository<Product>,
    categories: PgRepository<Category>,
    suppliers: PgRepository<Supplier>,
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self {
            products: PgRepository::new(db.clone()),
            categories: PgRepository::new(db.clone()),
            suppliers: PgRepository::new(db.clone()),
            db,
        }
    }

    /// All products with the requested relations attached
    pub async fn list(&self, includes: &[Include]) -> AppResult<Vec<ProductDetails>> {
        let products = self.products.get_all(None).await?;
        self.with_relations(products, includes).await
    }

    /// Products matching a listing criterion, with category and supplier
    pub async fn filter(&self, filter: ProductFilter) -> AppResult<Vec<ProductDetails>> {
        let products = self.list(&Include::ALL).await?;
        Ok(filter_products(products, filter))
    }

    /// Same rule as `Product::is_low_stock`
    pub async fn low_stock(&self) -> AppResult<Vec<ProductDetails>> {
        let products = self
            .products
            .find_where("stock_quantity > 0 AND stock_quantity <= low_stock_threshold")
            .await?;
        self.with_relations(products, &[Include::Category]).await
    }

    pub async fn out_of_stock(&self) -> AppResult<Vec<ProductDetails>> {
        let products = self.products.find_where("stock_quantity = 0").await?;
        self.with_relations(products, &[Include::Category]).await
    }

    /// One product with its category and supplier
    pub async fn details(&self, id: i64) -> AppResult<ProductDetails> {
        let product = self.products.require(id).await?;

        let category = match product.category_id {
            Some(category_id) => self.categories.get_by_id(category_id).await?,
            None => None,
        };
        let supplier = match product.supplier_id {
            Some(supplier_id) => self.suppliers.get_by_id(supplier_id).await?,
            None => None,
        };

        Ok(ProductDetails {
            product,
            category,
            supplier,
        })
    }

    /// Create a product together with its initial stock entry
    pub async fn create(&self, identity: &Identity, input: NewProduct) -> AppResult<ProductDetails> {
        input.validate()?;
        self.check_references(input.category_id, input.supplier_id)
            .await?;

        let draft = input.into_draft(&identity.name, Utc::now());
        let mut tx = self.db.begin().await?;

        let product = repository::insert::<Product, _>(&mut *tx, &draft).await?;
        let entry = ledger::initial_stock(&product, product.created_date)?;
        repository::insert::<StockLevel, _>(&mut *tx, &entry).await?;

        tx.commit().await?;

        tracing::info!(
            "Product {} ({}) created by {} with {} in stock",
            product.id,
            product.name,
            identity.name,
            product.stock_quantity
        );
        self.details(product.id).await
    }

    /// Edit a product; a changed count is recorded in the ledger
    ///
    /// The count before the edit is the stored one, read under lock. An
    /// `old_quantity` sent by the client must match it, otherwise someone
    /// else moved the stock since the form was loaded.
    pub async fn update(&self, id: i64, input: ProductUpdate) -> AppResult<ProductDetails> {
        input.validate()?;
        self.check_references(input.category_id, input.supplier_id)
            .await?;

        let mut tx = self.db.begin().await?;
        let current = repository::fetch_for_update::<Product, _>(&mut *tx, id).await?;

        if let Some(old_quantity) = input.old_quantity {
            if old_quantity != current.stock_quantity {
                return Err(AppError::Conflict {
                    resource: "stock_quantity".to_string(),
                    message: format!(
                        "Stock changed from {} to {} while editing; reload and retry",
                        old_quantity, current.stock_quantity
                    ),
                });
            }
        }

        let adjustment = ledger::edit_adjustment(
            id,
            current.stock_quantity,
            input.stock_quantity,
            Utc::now(),
        )?;

        let draft = input.apply_to(&current);
        let product = repository::update_in::<Product, _>(&mut *tx, id, &draft).await?;
        if let Some(entry) = &adjustment {
            repository::insert::<StockLevel, _>(&mut *tx, entry).await?;
        }

        tx.commit().await?;

        if let Some(entry) = adjustment {
            tracing::info!(
                "Product {} edited, stock {} by {}",
                product.id,
                entry.change_type,
                entry.quantity_change
            );
        }
        self.details(product.id).await
    }

    /// Delete a product; its ledger history is kept
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.products.delete(id).await?;
        tracing::info!("Product {} deleted", id);
        Ok(())
    }

    /// Point the product at a stored image
    ///
    /// Only the image column is written; the stock count is owned by the
    /// ledger paths.
    pub async fn set_image(&self, id: i64, image: String) -> AppResult<ProductDetails> {
        repository::update_column::<Product, _, _>(&self.db, id, "image", Some(image)).await?;
        self.details(id).await
    }

    async fn with_relations(
        &self,
        products: Vec<Product>,
        includes: &[Include],
    ) -> AppResult<Vec<ProductDetails>> {
        let categories = if includes.contains(&Include::Category) {
            self.categories.get_all(None).await?
        } else {
            Vec::new()
        };
        let suppliers = if includes.contains(&Include::Supplier) {
            self.suppliers.get_all(None).await?
        } else {
            Vec::new()
        };

        Ok(attach_relations(products, &categories, &suppliers, includes))
    }

    /// Referenced category and supplier must exist
    async fn check_references(
        &self,
        category_id: Option<i64>,
        supplier_id: Option<i64>,
    ) -> AppResult<()> {
        if let Some(category_id) = category_id {
            if self.categories.get_by_id(category_id).await?.is_none() {
                return Err(AppError::validation("category_id", "Category does not exist"));
            }
        }
        if let Some(supplier_id) = supplier_id {
            if self.suppliers.get_by_id(supplier_id).await?.is_none() {
                return Err(AppError::validation("supplier_id", "Supplier does not exist"));
            }
        }
        Ok(())
    }
}
