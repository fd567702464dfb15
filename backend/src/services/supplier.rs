//! Supplier service

use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::repository::{PgRepository, Repository};
use shared::access::Identity;
use shared::models::{Supplier, SupplierInput};
use shared::validation::validate_name;

/// Supplier management
#[derive(Clone)]
pub struct SupplierService {
    suppliers: PgRepository<Supplier>,
}

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self {
            suppliers: PgRepository::new(db),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Supplier>> {
        self.suppliers.get_all(None).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Supplier> {
        self.suppliers.require(id).await
    }

    /// Create a supplier; the name must not be in use
    pub async fn create(&self, identity: &Identity, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        let input = checked(input)?;
        if self.suppliers.name_taken(&input.name, None).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let supplier = self.suppliers.add(&input).await?;
        tracing::info!("Supplier {} created by {}", supplier.name, identity.name);
        Ok(supplier)
    }

    /// Edit a supplier; a new name must not belong to another one
    pub async fn update(&self, id: i64, input: SupplierInput) -> AppResult<Supplier> {
        self.suppliers.require(id).await?;
        input.validate()?;
        let input = checked(input)?;
        if self.suppliers.name_taken(&input.name, Some(id)).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        self.suppliers.update(id, &input).await
    }

    /// Delete a supplier; its products keep existing without one
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.suppliers.delete(id).await?;
        tracing::info!("Supplier {} deleted", id);
        Ok(())
    }
}

fn checked(input: SupplierInput) -> AppResult<SupplierInput> {
    validate_name(&input.name).map_err(|message| AppError::validation("name", message))?;
    Ok(input.normalized())
}
