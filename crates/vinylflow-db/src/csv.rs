//! # CSV Import/Export Bridge
//!
//! Bulk data exchange between the store and CSV files.
//!
//! ## Import Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Row-Level Fault Tolerance                           │
//! │                                                                         │
//! │  for each CSV row:                                                      │
//! │     parse ──► validate ──► insert                                       │
//! │        │failure at any step                                             │
//! │        ▼                                                                 │
//! │     log a warning, skip the row, keep going                             │
//! │                                                                         │
//! │  return: number of rows actually imported                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One bad row never aborts a bulk load. Only file-level failures
//! (unreadable file, malformed CSV structure) abort the whole import.
//!
//! ## Export Columns
//! - records:   id, artist, album, genre, year, price, stock, date_added
//! - customers: id, username, email, full_name, address, phone,
//!   registration_date, is_active  (no password hash, ever)
//! - sales:     id, customer_id, sale_date, total_amount, status,
//!   shipping_address, username, email
//!
//! Prices travel as decimal strings ("25.00"); dates as RFC 3339.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use vinylflow_core::{CoreError, Money, NewCustomer, NewItem};

/// Rows fetched per page while streaming an export.
const EXPORT_PAGE_SIZE: u32 = 500;

/// CSV import/export over an open database.
#[derive(Debug, Clone)]
pub struct CsvBridge {
    db: Database,
}

// =============================================================================
// Row Shapes
// =============================================================================

/// An inventory row as it appears in a CSV file.
///
/// Everything is a string on the wire; parsing happens on import. Missing
/// columns default to empty, so partial files still load.
#[derive(Debug, Serialize, Deserialize)]
struct RecordRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    album: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    stock: String,
    #[serde(default)]
    date_added: String,
}

/// A customer row as read from an import file. Carries a plaintext
/// `password` column to be hashed on registration; files without that
/// column still parse (the row then fails password validation and is
/// skipped).
#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    registration_date: String,
    #[serde(default)]
    is_active: String,
}

/// A customer row as written to an export file. Has no password column
/// at all: hashes never leave the database and plaintext no longer
/// exists.
#[derive(Debug, Serialize)]
struct CustomerExportRow {
    id: String,
    username: String,
    email: String,
    full_name: String,
    address: String,
    phone: String,
    registration_date: String,
    is_active: String,
}

/// A sales-history row for export (export only; sales are not importable).
#[derive(Debug, sqlx::FromRow)]
struct SaleExportRow {
    id: i64,
    customer_id: Option<i64>,
    sale_date: DateTime<Utc>,
    total_cents: i64,
    status: String,
    shipping_address: Option<String>,
    username: Option<String>,
    email: Option<String>,
}

fn none_if_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl CsvBridge {
    /// Creates a new bridge over an open database.
    pub fn new(db: Database) -> Self {
        CsvBridge { db }
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Exports the full catalog to a CSV file.
    ///
    /// ## Returns
    /// The number of rows written.
    pub async fn export_records(&self, path: impl AsRef<Path>) -> DbResult<usize> {
        let path = path.as_ref();
        info!(path = %path.display(), "Exporting records to CSV");

        let mut writer = csv::Writer::from_path(path)?;
        let catalog = self.db.catalog();

        let mut offset = 0u32;
        let mut written = 0usize;
        loop {
            let page = catalog.list(EXPORT_PAGE_SIZE, offset).await?;
            if page.is_empty() {
                break;
            }
            offset += page.len() as u32;

            for item in page {
                writer.serialize(RecordRow {
                    id: item.id.to_string(),
                    artist: item.artist,
                    album: item.album,
                    genre: item.genre.unwrap_or_default(),
                    year: item.year.map(|y| y.to_string()).unwrap_or_default(),
                    price: Money::from_cents(item.price_cents).to_decimal_string(),
                    stock: item.stock.to_string(),
                    date_added: item.date_added.to_rfc3339(),
                })?;
                written += 1;
            }
        }

        writer.flush()?;
        info!(rows = written, "Record export complete");
        Ok(written)
    }

    /// Exports all customers to a CSV file. The column set carries no
    /// password column.
    pub async fn export_customers(&self, path: impl AsRef<Path>) -> DbResult<usize> {
        let path = path.as_ref();
        info!(path = %path.display(), "Exporting customers to CSV");

        let mut writer = csv::Writer::from_path(path)?;
        let customers = self.db.customers();

        let mut offset = 0u32;
        let mut written = 0usize;
        loop {
            let page = customers.list(EXPORT_PAGE_SIZE, offset).await?;
            if page.is_empty() {
                break;
            }
            offset += page.len() as u32;

            for customer in page {
                writer.serialize(CustomerExportRow {
                    id: customer.id.to_string(),
                    username: customer.username,
                    email: customer.email.unwrap_or_default(),
                    full_name: customer.full_name.unwrap_or_default(),
                    address: customer.address.unwrap_or_default(),
                    phone: customer.phone.unwrap_or_default(),
                    registration_date: customer.registration_date.to_rfc3339(),
                    is_active: customer.is_active.to_string(),
                })?;
                written += 1;
            }
        }

        writer.flush()?;
        info!(rows = written, "Customer export complete");
        Ok(written)
    }

    /// Exports the sales history to a CSV file, with the buyer's username
    /// and email joined in where the sale has a customer.
    pub async fn export_sales(&self, path: impl AsRef<Path>) -> DbResult<usize> {
        let path = path.as_ref();
        info!(path = %path.display(), "Exporting sales to CSV");

        let rows = sqlx::query_as::<_, SaleExportRow>(
            r#"
            SELECT s.id, s.customer_id, s.sale_date, s.total_cents, s.status,
                   s.shipping_address, c.username, c.email
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            ORDER BY s.id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "id",
            "customer_id",
            "sale_date",
            "total_amount",
            "status",
            "shipping_address",
            "username",
            "email",
        ])?;

        let mut written = 0usize;
        for row in rows {
            writer.write_record([
                row.id.to_string(),
                row.customer_id.map(|id| id.to_string()).unwrap_or_default(),
                row.sale_date.to_rfc3339(),
                Money::from_cents(row.total_cents).to_decimal_string(),
                row.status,
                row.shipping_address.unwrap_or_default(),
                row.username.unwrap_or_default(),
                row.email.unwrap_or_default(),
            ])?;
            written += 1;
        }

        writer.flush()?;
        info!(rows = written, "Sales export complete");
        Ok(written)
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Imports inventory items from a CSV file.
    ///
    /// The `id` and `date_added` columns are ignored; the store assigns
    /// fresh values. Bad rows (unparsable price, missing artist, duplicate
    /// (artist, album) pair, ...) are logged and skipped.
    ///
    /// ## Returns
    /// The number of rows actually inserted.
    pub async fn import_records(&self, path: impl AsRef<Path>) -> DbResult<usize> {
        let path = path.as_ref();
        info!(path = %path.display(), "Importing records from CSV");

        let mut reader = csv::Reader::from_path(path)?;
        let catalog = self.db.catalog();

        let mut imported = 0usize;
        let mut skipped = 0usize;
        for (line, result) in reader.deserialize::<RecordRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!(line = line + 2, error = %e, "Skipping unreadable CSV row");
                    skipped += 1;
                    continue;
                }
            };

            let item = match parse_record_row(&row) {
                Ok(item) => item,
                Err(reason) => {
                    warn!(line = line + 2, artist = %row.artist, album = %row.album,
                          reason = %reason, "Skipping invalid record row");
                    skipped += 1;
                    continue;
                }
            };

            match catalog.add(&item).await {
                Ok(_) => imported += 1,
                Err(DbError::UniqueViolation { .. }) => {
                    debug!(artist = %item.artist, album = %item.album,
                           "Skipping duplicate record");
                    skipped += 1;
                }
                Err(DbError::Core(e)) => {
                    warn!(line = line + 2, error = %e, "Skipping rejected record row");
                    skipped += 1;
                }
                // Infrastructure failures abort the whole import
                Err(e) => return Err(e),
            }
        }

        info!(imported, skipped, "Record import complete");
        Ok(imported)
    }

    /// Imports customers from a CSV file. Rows whose username is already
    /// taken are skipped; the `password` column is hashed on insert.
    ///
    /// ## Returns
    /// The number of rows actually inserted.
    pub async fn import_customers(&self, path: impl AsRef<Path>) -> DbResult<usize> {
        let path = path.as_ref();
        info!(path = %path.display(), "Importing customers from CSV");

        let mut reader = csv::Reader::from_path(path)?;
        let customers = self.db.customers();

        let mut imported = 0usize;
        let mut skipped = 0usize;
        for (line, result) in reader.deserialize::<CustomerRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!(line = line + 2, error = %e, "Skipping unreadable CSV row");
                    skipped += 1;
                    continue;
                }
            };

            let new_customer = NewCustomer {
                username: row.username,
                password: row.password,
                email: none_if_empty(row.email),
                full_name: none_if_empty(row.full_name),
                address: none_if_empty(row.address),
                phone: none_if_empty(row.phone),
            };

            match customers.register(&new_customer).await {
                Ok(_) => imported += 1,
                Err(DbError::Core(CoreError::DuplicateUsername { username })) => {
                    debug!(username = %username, "Skipping duplicate customer");
                    skipped += 1;
                }
                Err(DbError::Core(e)) => {
                    warn!(line = line + 2, username = %new_customer.username,
                          error = %e, "Skipping invalid customer row");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(imported, skipped, "Customer import complete");
        Ok(imported)
    }
}

/// Parses a CSV record row into a NewItem, or a human-readable reason for
/// skipping it. Empty year means unknown; empty stock means zero.
fn parse_record_row(row: &RecordRow) -> Result<NewItem, String> {
    let price =
        Money::from_decimal_str(row.price.trim()).map_err(|e| format!("bad price: {e}"))?;

    let year = match row.year.trim() {
        "" => None,
        s => Some(s.parse::<i64>().map_err(|_| format!("bad year: {s:?}"))?),
    };

    let stock = match row.stock.trim() {
        "" => 0,
        s => s.parse::<i64>().map_err(|_| format!("bad stock: {s:?}"))?,
    };

    Ok(NewItem {
        artist: row.artist.trim().to_string(),
        album: row.album.trim().to_string(),
        genre: none_if_empty(row.genre.clone()),
        year,
        price,
        stock,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
