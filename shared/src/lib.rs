//! Shared types and domain logic for the Inventory Management System
//!
//! This crate holds the entity models together with the pure rules the
//! backend builds on: stock ledger accounting, report aggregation, the
//! access policy, and input validation. Nothing in here touches I/O.

pub mod access;
pub mod ledger;
pub mod models;
pub mod reporting;
pub mod types;
pub mod validation;

pub use access::*;
pub use models::*;
pub use types::*;
