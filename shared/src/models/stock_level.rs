//! Stock ledger models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason tag recorded on a ledger entry
///
/// Stored as text. Matching is case-sensitive, and unknown tags are kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ChangeType {
    InitialStock,
    Add,
    Remove,
    Other(String),
}

impl ChangeType {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeType::InitialStock => "Initial Stock",
            ChangeType::Add => "add",
            ChangeType::Remove => "remove",
            ChangeType::Other(tag) => tag,
        }
    }

    /// Tag for an edit that moved the quantity by `delta`; none for zero
    pub fn for_delta(delta: i32) -> Option<Self> {
        match delta {
            0 => None,
            d if d > 0 => Some(ChangeType::Add),
            _ => Some(ChangeType::Remove),
        }
    }
}

impl From<String> for ChangeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Initial Stock" => ChangeType::InitialStock,
            "add" => ChangeType::Add,
            "remove" => ChangeType::Remove,
            _ => ChangeType::Other(tag),
        }
    }
}

impl From<&str> for ChangeType {
    fn from(tag: &str) -> Self {
        ChangeType::from(tag.to_string())
    }
}

impl From<ChangeType> for String {
    fn from(change_type: ChangeType) -> Self {
        match change_type {
            ChangeType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry of the stock ledger
///
/// `product_id` is kept after the product is deleted, so history survives
/// the product it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub id: i64,
    pub product_id: i64,
    pub quantity_change: i32,
    pub change_date: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub change_type: ChangeType,
}

/// Column values of a ledger entry about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct StockLevelDraft {
    pub product_id: i64,
    pub quantity_change: i32,
    pub change_date: DateTime<Utc>,
    pub change_type: ChangeType,
}
