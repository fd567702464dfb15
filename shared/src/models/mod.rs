//! Domain models for the Inventory Management System

mod category;
mod product;
mod stock_level;
mod supplier;
mod user;

pub use category::*;
pub use product::*;
pub use stock_level::*;
pub use supplier::*;
pub use user::*;
