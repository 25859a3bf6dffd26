//! # Repository Layer
//!
//! One repository per aggregate, each a thin struct over the shared pool:
//!
//! - [`catalog::CatalogRepository`] - Inventory CRUD, search, stock
//! - [`customer::CustomerRepository`] - Registration and authentication
//! - [`sale::SaleRepository`] - Atomic checkout and sales history
//! - [`stats::StatsRepository`] - Derived read-only inventory/sales views
//!
//! Repositories validate their inputs with `vinylflow-core` validators
//! before touching the database, so constraint violations are the backstop
//! rather than the primary error path.

pub mod catalog;
pub mod customer;
pub mod sale;
pub mod stats;
