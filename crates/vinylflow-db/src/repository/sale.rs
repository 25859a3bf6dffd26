//! # Sale Repository
//!
//! Atomic checkout and sales history.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     create_sale: All or Nothing                          │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├─ 1. Read price + stock per record (duplicate lines combined)       │
//! │    │      missing item?      → ItemNotFound,      ROLLBACK              │
//! │    │      stock < combined?  → InsufficientStock, ROLLBACK              │
//! │    │                                                                    │
//! │    ├─ 2. Insert sale header (total = Σ price × quantity)                │
//! │    │                                                                    │
//! │    ├─ 3. Per line: insert sale_item (price captured from step 1)        │
//! │    │              + decrement stock                                     │
//! │    │                                                                    │
//! │  COMMIT ──► sale id                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All reads and writes run on the one transaction connection, so a
//! concurrent checkout can't slip between the stock check and the
//! decrement. Any error before COMMIT drops the transaction, which rolls
//! it back.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use vinylflow_core::{
    validation, CoreError, Money, Sale, SaleDetail, SaleDetailLine, SaleLine, SaleStatus,
    SaleSummary,
};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale atomically: validates every line, then writes the
    /// sale header, its line items, and the stock decrements in a single
    /// transaction.
    ///
    /// Each line captures the item's price at the moment of sale, so later
    /// price changes never rewrite history. The sale starts in `Pending`
    /// status. Duplicate lines for the same record are merged into one
    /// line item, and their combined quantity is what gets checked
    /// against stock.
    ///
    /// ## Arguments
    /// * `customer_id` - Buyer, or `None` for an anonymous walk-in sale
    /// * `lines` - (record, quantity) pairs; must be non-empty
    /// * `shipping_address` - Optional delivery address
    ///
    /// ## Returns
    /// The id of the new sale.
    ///
    /// ## Errors
    /// * `EmptySale` - No lines
    /// * `ItemNotFound` - A line references a record that doesn't exist
    /// * `InsufficientStock` - A record's combined requested quantity
    ///   exceeds its stock
    ///
    /// On any error no rows are written and no stock changes.
    pub async fn create_sale(
        &self,
        customer_id: Option<i64>,
        lines: &[SaleLine],
        shipping_address: Option<&str>,
    ) -> DbResult<i64> {
        if lines.is_empty() {
            return Err(DbError::Core(CoreError::EmptySale));
        }
        for line in lines {
            validation::validate_quantity(line.quantity)?;
        }

        debug!(
            customer_id = ?customer_id,
            line_count = lines.len(),
            "Starting sale transaction"
        );

        let mut tx = self.pool.begin().await?;

        // Aggregate per record (first-seen order) so duplicate lines are
        // one combined request. Checking them independently would let two
        // lines of 2 pass against a stock of 3.
        let mut requests: Vec<(i64, i64)> = Vec::with_capacity(lines.len());
        for line in lines {
            match requests.iter_mut().find(|(id, _)| *id == line.record_id) {
                Some((_, quantity)) => *quantity += line.quantity,
                None => requests.push((line.record_id, line.quantity)),
            }
        }

        // Step 1: validate every request before mutating anything. The
        // reads run on the transaction connection, so these prices and
        // stock levels hold until COMMIT.
        let mut priced: Vec<(i64, i64, i64)> = Vec::with_capacity(requests.len());
        for (record_id, quantity) in requests {
            let row: Option<(i64, i64)> =
                sqlx::query_as("SELECT price_cents, stock FROM records WHERE id = ?1")
                    .bind(record_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let (price_cents, stock) = match row {
                Some(r) => r,
                None => return Err(DbError::Core(CoreError::ItemNotFound(record_id))),
            };

            if stock < quantity {
                return Err(DbError::Core(CoreError::InsufficientStock {
                    record_id,
                    available: stock,
                    requested: quantity,
                }));
            }

            priced.push((record_id, quantity, price_cents));
        }

        let total_cents: i64 = priced.iter().map(|(_, qty, price)| price * qty).sum();
        let now = Utc::now();

        // Step 2: sale header.
        let sale_id = sqlx::query(
            r#"
            INSERT INTO sales (customer_id, sale_date, total_cents, status, shipping_address)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(customer_id)
        .bind(now)
        .bind(total_cents)
        .bind(SaleStatus::Pending)
        .bind(shipping_address)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        // Step 3: line items + stock decrements.
        for (record_id, quantity, price_cents) in &priced {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, record_id, quantity, price_at_time_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(sale_id)
            .bind(record_id)
            .bind(quantity)
            .bind(price_cents)
            .execute(&mut *tx)
            .await?;

            let updated =
                sqlx::query("UPDATE records SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2")
                    .bind(record_id)
                    .bind(quantity)
                    .execute(&mut *tx)
                    .await?;

            // The aggregated step-1 check makes this match exactly one
            // row; anything else means the stock moved underneath the
            // transaction, so abort instead of committing a partial
            // decrement.
            if updated.rows_affected() != 1 {
                return Err(DbError::Internal(format!(
                    "stock for record {record_id} changed during sale"
                )));
            }
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            total = %Money::from_cents(total_cents),
            "Sale committed"
        );

        Ok(sale_id)
    }

    /// Lists a customer's sales, newest first, each with its line count.
    ///
    /// An unknown customer id yields an empty list.
    pub async fn get_customer_sales(&self, customer_id: i64) -> DbResult<Vec<SaleSummary>> {
        let sales = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.customer_id, s.sale_date, s.total_cents, s.status,
                   s.shipping_address, COUNT(si.id) AS item_count
            FROM sales s
            LEFT JOIN sale_items si ON si.sale_id = s.id
            WHERE s.customer_id = ?1
            GROUP BY s.id
            ORDER BY s.sale_date DESC, s.id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Fetches a sale with all its line items, joined against the catalog
    /// for display names.
    ///
    /// Lines whose record was later hard-deleted still appear, with the
    /// captured price and quantity but no artist/album/genre.
    pub async fn get_sale_detail(&self, sale_id: i64) -> DbResult<Option<SaleDetail>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, customer_id, sale_date, total_cents, status, shipping_address \
             FROM sales WHERE id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        let sale = match sale {
            Some(s) => s,
            None => return Ok(None),
        };

        let items = sqlx::query_as::<_, SaleDetailLine>(
            r#"
            SELECT si.record_id, si.quantity, si.price_at_time_cents,
                   r.artist, r.album, r.genre
            FROM sale_items si
            LEFT JOIN records r ON r.id = si.record_id
            WHERE si.sale_id = ?1
            ORDER BY si.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SaleDetail { sale, items }))
    }

    /// Moves a sale to a new status (fulfilment or cancellation).
    ///
    /// Cancelling does not restock; returns are a manual catalog
    /// correction.
    ///
    /// ## Returns
    /// * `Ok(true)` - Status updated
    /// * `Ok(false)` - No sale with that id
    pub async fn set_status(&self, sale_id: i64, status: SaleStatus) -> DbResult<bool> {
        debug!(sale_id = %sale_id, status = %status.as_str(), "Updating sale status");

        let result = sqlx::query("UPDATE sales SET status = ?2 WHERE id = ?1")
            .bind(sale_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
