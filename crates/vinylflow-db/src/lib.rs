//! # vinylflow-db: Storage Layer for VinylFlow
//!
//! This crate provides persistence for the VinylFlow record shop.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VinylFlow Data Flow                               │
//! │                                                                         │
//! │  Desktop UI event (add record, checkout, ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    vinylflow-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ catalog.rs     │    │  (embedded)  │  │   │
//! │  │   │               │    │ customer.rs    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ sale.rs        │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ stats.rs       │    │ 002_idx.sql  │  │   │
//! │  │   │ Management    │    │                │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   csv.rs (bulk import/export)   prefs.rs (UI preferences)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │              <data dir>/vinylflow.db  (WAL mode)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`repository`] - Repository implementations (catalog, customer, sale, stats)
//! - [`csv`] - Bulk CSV import/export
//! - [`prefs`] - JSON-file UI preferences
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vinylflow_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/vinylflow.db")).await?;
//!
//! // Use repositories
//! let hits = db.catalog().search("floyd", 20).await?;
//! let sale_id = db.sales().create_sale(Some(customer_id), &lines, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod csv;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod prefs;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use crate::csv::CsvBridge;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use prefs::{PrefsError, ThemePrefs};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::sale::SaleRepository;
pub use repository::stats::StatsRepository;
