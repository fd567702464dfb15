//! Common types used across the system

use serde::{Deserialize, Serialize};

/// Product listing criterion
///
/// Parsed leniently: an empty or unrecognized criterion means no filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFilter {
    #[default]
    All,
    LowStock,
    OutOfStock,
}

impl ProductFilter {
    pub fn parse(criterion: &str) -> Self {
        match criterion {
            "low" => ProductFilter::LowStock,
            "out" => ProductFilter::OutOfStock,
            _ => ProductFilter::All,
        }
    }

    /// Heading shown above a filtered product list
    pub fn label(&self) -> &'static str {
        match self {
            ProductFilter::All => "All Products",
            ProductFilter::LowStock => "low stock products",
            ProductFilter::OutOfStock => "out of stock products",
        }
    }
}

/// Relation to eager-load alongside a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Include {
    Category,
    Supplier,
}

impl Include {
    pub const ALL: [Include; 2] = [Include::Category, Include::Supplier];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        assert_eq!(ProductFilter::parse("low"), ProductFilter::LowStock);
        assert_eq!(ProductFilter::parse("out"), ProductFilter::OutOfStock);
        assert_eq!(ProductFilter::parse(""), ProductFilter::All);
        assert_eq!(ProductFilter::parse("LOW"), ProductFilter::All);
        assert_eq!(ProductFilter::parse("expired"), ProductFilter::All);
    }
}
