//! # Statistics Repository
//!
//! Derived, read-only views over the catalog and sales history.
//!
//! ## Computation Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      statistics()                                        │
//! │                                                                         │
//! │  SELECT * FROM records ORDER BY id ──► one pass in Rust:               │
//! │     totals, value, distributions, stock buckets, price extremes         │
//! │                                                                         │
//! │  SELECT COUNT, SUM(total) FROM sales                                    │
//! │     WHERE status != 'cancelled' ──► sales rollup                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog fetch is ordered by id so the price-extreme tie-break
//! (first inserted wins) is deterministic.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vinylflow_core::{
    InventoryItem, Money, SalesRollup, Statistics, LOW_STOCK_THRESHOLD,
};

/// Repository for aggregate statistics. Read-only.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Creates a new StatsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Computes the full statistics snapshot.
    ///
    /// All figures are consistent with the catalog at the moment of the
    /// fetch. An empty catalog yields zeros, empty distributions, and no
    /// price extremes.
    pub async fn statistics(&self) -> DbResult<Statistics> {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT id, artist, album, genre, year, price_cents, stock, date_added \
             FROM records ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(record_count = items.len(), "Computing statistics");

        let mut stats = Statistics {
            total_records: items.len() as i64,
            ..Default::default()
        };

        for item in items {
            stats.total_stock += item.stock;
            stats.total_value += item.stock_value();

            if let Some(genre) = item.genre.as_deref() {
                if !genre.is_empty() {
                    *stats.genre_distribution.entry(genre.to_string()).or_insert(0) += 1;
                }
            }
            if let Some(year) = item.year {
                if year > 0 {
                    *stats.year_distribution.entry(year).or_insert(0) += 1;
                }
            }

            if item.stock == 0 {
                stats.out_of_stock.push(item.clone());
            } else if item.stock <= LOW_STOCK_THRESHOLD {
                stats.low_stock.push(item.clone());
            }

            // Strict comparisons: on a price tie the earliest item wins.
            match &stats.most_expensive {
                Some(max) if item.price_cents <= max.price_cents => {}
                _ => stats.most_expensive = Some(item.clone()),
            }
            match &stats.least_expensive {
                Some(min) if item.price_cents >= min.price_cents => {}
                _ => stats.least_expensive = Some(item),
            }
        }

        stats.avg_price = if stats.total_stock > 0 {
            Money::from_cents(stats.total_value.cents() / stats.total_stock)
        } else {
            Money::zero()
        };

        stats.sales = self.sales_rollup().await?;

        Ok(stats)
    }

    /// Rolls up non-cancelled sales: count, gross total, and mean total.
    pub async fn sales_rollup(&self) -> DbResult<SalesRollup> {
        let (count, total_cents): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE status != 'cancelled'",
        )
        .fetch_one(&self.pool)
        .await?;

        let average = if count > 0 {
            Money::from_cents(total_cents / count)
        } else {
            Money::zero()
        };

        Ok(SalesRollup {
            count,
            total: Money::from_cents(total_cents),
            average,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vinylflow_core::{NewItem, SaleLine, SaleStatus};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed(
        db: &Database,
        artist: &str,
        album: &str,
        genre: Option<&str>,
        year: Option<i64>,
        cents: i64,
        stock: i64,
    ) -> i64 {
        db.catalog()
            .add(&NewItem {
                artist: artist.to_string(),
                album: album.to_string(),
                genre: genre.map(str::to_string),
                year,
                price: Money::from_cents(cents),
                stock,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let db = test_db().await;
        let stats = db.stats().statistics().await.unwrap();

        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.total_stock, 0);
        assert!(stats.total_value.is_zero());
        assert!(stats.avg_price.is_zero());
        assert!(stats.genre_distribution.is_empty());
        assert!(stats.year_distribution.is_empty());
        assert!(stats.out_of_stock.is_empty());
        assert!(stats.low_stock.is_empty());
        assert!(stats.most_expensive.is_none());
        assert!(stats.least_expensive.is_none());
        assert_eq!(stats.sales.count, 0);
        assert!(stats.sales.total.is_zero());
        assert!(stats.sales.average.is_zero());
    }

    #[tokio::test]
    async fn test_inventory_aggregates() {
        let db = test_db().await;
        // $25.00 × 2 + $10.00 × 10 = $150.00 over 12 units
        seed(&db, "Pink Floyd", "The Wall", Some("Rock"), Some(1979), 2500, 2).await;
        seed(&db, "Miles Davis", "Kind of Blue", Some("Jazz"), Some(1959), 1000, 10).await;
        seed(&db, "Unknown", "Bootleg", None, None, 1500, 0).await;

        let stats = db.stats().statistics().await.unwrap();

        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_stock, 12);
        assert_eq!(stats.total_value, Money::from_cents(15000));
        // 15000 / 12 = 1250
        assert_eq!(stats.avg_price, Money::from_cents(1250));

        assert_eq!(stats.genre_distribution.len(), 2);
        assert_eq!(stats.genre_distribution.get("Rock"), Some(&1));
        assert_eq!(stats.genre_distribution.get("Jazz"), Some(&1));
        assert_eq!(stats.year_distribution.get(&1979), Some(&1));
        assert_eq!(stats.year_distribution.get(&1959), Some(&1));
        // Missing genre/year simply excluded from distributions
        assert_eq!(stats.year_distribution.len(), 2);
    }

    #[tokio::test]
    async fn test_stock_buckets() {
        let db = test_db().await;
        seed(&db, "A", "Out", None, None, 1000, 0).await;
        seed(&db, "B", "Low", None, None, 1000, LOW_STOCK_THRESHOLD).await;
        seed(&db, "C", "Healthy", None, None, 1000, LOW_STOCK_THRESHOLD + 1).await;

        let stats = db.stats().statistics().await.unwrap();

        assert_eq!(stats.out_of_stock.len(), 1);
        assert_eq!(stats.out_of_stock[0].album, "Out");
        assert_eq!(stats.low_stock.len(), 1);
        assert_eq!(stats.low_stock[0].album, "Low");
    }

    #[tokio::test]
    async fn test_price_extremes_first_wins_on_tie() {
        let db = test_db().await;
        seed(&db, "A", "First Cheap", None, None, 500, 1).await;
        seed(&db, "B", "Expensive", None, None, 9900, 1).await;
        seed(&db, "C", "Second Cheap", None, None, 500, 1).await;
        seed(&db, "D", "Also Expensive", None, None, 9900, 1).await;

        let stats = db.stats().statistics().await.unwrap();

        assert_eq!(stats.most_expensive.unwrap().album, "Expensive");
        assert_eq!(stats.least_expensive.unwrap().album, "First Cheap");
    }

    #[tokio::test]
    async fn test_sales_rollup_excludes_cancelled() {
        let db = test_db().await;
        let record_id = seed(&db, "Pink Floyd", "The Wall", None, None, 2500, 10).await;

        let line = [SaleLine {
            record_id,
            quantity: 1,
        }];
        let kept = db.sales().create_sale(None, &line, None).await.unwrap();
        let line2 = [SaleLine {
            record_id,
            quantity: 3,
        }];
        db.sales().create_sale(None, &line2, None).await.unwrap();
        let cancelled = db.sales().create_sale(None, &line, None).await.unwrap();
        db.sales()
            .set_status(cancelled, SaleStatus::Cancelled)
            .await
            .unwrap();
        db.sales()
            .set_status(kept, SaleStatus::Completed)
            .await
            .unwrap();

        let rollup = db.stats().sales_rollup().await.unwrap();
        // 2500 + 7500, the cancelled 2500 excluded; pending + completed both count
        assert_eq!(rollup.count, 2);
        assert_eq!(rollup.total, Money::from_cents(10000));
        assert_eq!(rollup.average, Money::from_cents(5000));
    }
}
