//! # Domain Types
//!
//! Core domain types used throughout VinylFlow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │    Customer     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  artist/album   │   │  username       │   │  customer_id?   │       │
//! │  │  price_cents    │   │  (NO hash here) │   │  total_cents    │       │
//! │  │  stock          │   │  is_active      │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  SaleItem freezes price_at_time_cents so history survives repricing.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Containment
//! `Customer` has no password hash field at all. The hash exists only in a
//! private row type inside the credential repository, so it structurally
//! cannot leak to the UI client, CSV export, or logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::money::Money;

// =============================================================================
// Inventory Item
// =============================================================================

/// A record (album) in the shop's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryItem {
    /// Unique identifier, assigned by the store on creation.
    pub id: i64,

    /// Performing artist. Required; (artist, album) pairs are unique.
    pub artist: String,

    /// Album title. Required.
    pub album: String,

    /// Musical genre. Optional.
    pub genre: Option<String>,

    /// Release year. Optional.
    pub year: Option<i64>,

    /// Unit price in cents. Always positive.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// When the item was added. Set at creation, immutable.
    pub date_added: DateTime<Utc>,
}

impl InventoryItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Total value of the units on hand (price × stock).
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price().multiply_quantity(self.stock)
    }
}

/// Fields for creating a new inventory item. The store assigns the id
/// and `date_added`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub artist: String,
    pub album: String,
    pub genre: Option<String>,
    pub year: Option<i64>,
    pub price: Money,
    pub stock: i64,
}

/// A partial update to an inventory item.
///
/// `None` fields are left untouched and are not re-validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i64>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

impl ItemPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.artist.is_none()
            && self.album.is_none()
            && self.genre.is_none()
            && self.year.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer profile.
///
/// Deliberately contains no password hash field; see module docs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    /// Unique login name.
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub registration_date: DateTime<Utc>,
    /// Soft-disable flag; inactive customers cannot authenticate.
    pub is_active: bool,
}

/// Registration input. The plaintext password is hashed by the
/// credential store and never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Placed but not yet fulfilled.
    Pending,
    /// Fulfilled and closed out.
    Completed,
    /// Cancelled; excluded from the sales rollup.
    Cancelled,
}

impl SaleStatus {
    /// Lowercase wire/storage form (`"pending"`, `"completed"`, `"cancelled"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    /// Buyer; absent for anonymous/guest checkout.
    pub customer_id: Option<i64>,
    pub sale_date: DateTime<Utc>,
    /// Immutable snapshot: sum of line totals at creation time.
    pub total_cents: i64,
    pub status: SaleStatus,
    pub shipping_address: Option<String>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One requested line of a sale: which record and how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub record_id: i64,
    pub quantity: i64,
}

/// A persisted line item of a sale.
/// The price is frozen at sale time, decoupled from the item's
/// current price, to preserve historical accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    /// The inventory item sold. No FK; may dangle after a hard delete.
    pub record_id: i64,
    pub quantity: i64,
    /// Unit price in cents captured when the sale was created.
    pub price_at_time_cents: i64,
}

impl SaleItem {
    /// Returns the captured unit price as Money.
    #[inline]
    pub fn price_at_time(&self) -> Money {
        Money::from_cents(self.price_at_time_cents)
    }

    /// Line total (price_at_time × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_time().multiply_quantity(self.quantity)
    }
}

/// A sale annotated with its line-item count, for customer history lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleSummary {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub sale_date: DateTime<Utc>,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub shipping_address: Option<String>,
    /// Number of line items in the sale.
    pub item_count: i64,
}

/// A sale line joined with its record's catalog fields.
///
/// The catalog fields are `Option` because records are hard-deleted
/// and historical line items may dangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleDetailLine {
    pub record_id: i64,
    pub quantity: i64,
    pub price_at_time_cents: i64,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
}

/// A sale with its joined line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleDetailLine>,
}

// =============================================================================
// Statistics
// =============================================================================

/// Count/sum/average of sale totals over sales where status ≠ cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRollup {
    pub count: i64,
    pub total: Money,
    pub average: Money,
}

/// Derived read-only view over the catalog and sales tables.
/// Recomputed on each call; nothing here is cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_records: i64,
    pub total_stock: i64,
    /// Σ price × stock over the catalog.
    pub total_value: Money,
    /// Value-weighted average price: total_value / total_stock,
    /// zero when total_stock is zero.
    pub avg_price: Money,
    /// genre → item count; items with empty/absent genre excluded.
    pub genre_distribution: HashMap<String, i64>,
    /// year → item count; items with year <= 0 excluded.
    pub year_distribution: HashMap<i64, i64>,
    /// Items with stock == 0.
    pub out_of_stock: Vec<InventoryItem>,
    /// Items with 0 < stock <= LOW_STOCK_THRESHOLD.
    pub low_stock: Vec<InventoryItem>,
    /// Highest-priced item; insertion-order tie-break, first wins.
    pub most_expensive: Option<InventoryItem>,
    /// Lowest-priced item; insertion-order tie-break, first wins.
    pub least_expensive: Option<InventoryItem>,
    pub sales: SalesRollup,
}

// =============================================================================
// Unit Tests
// =============================================================================
