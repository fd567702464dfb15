//! Supplier models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A supplier of products; names are unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for creating or editing a supplier, also its column values
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(length(min = 1, max = 100, message = "Supplier name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 100))]
    pub contact_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 250))]
    pub address: Option<String>,
}

impl SupplierInput {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}
