//! Business logic services for the Inventory Management System

pub mod admin;
pub mod auth;
pub mod category;
pub mod product;
pub mod reporting;
pub mod stock;
pub mod supplier;

pub use admin::AdminService;
pub use auth::AuthService;
pub use category::CategoryService;
pub use product::ProductService;
pub use reporting::ReportingService;
pub use stock::StockService;
pub use supplier::SupplierService;
