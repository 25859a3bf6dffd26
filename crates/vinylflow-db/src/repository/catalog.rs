//! # Catalog Repository
//!
//! Database operations for inventory items (records).
//!
//! ## Key Operations
//! - CRUD with partial updates
//! - Paginated listing ordered by (artist, album)
//! - Case-insensitive substring search over artist/album/genre
//! - Administrative stock corrections
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      How Search Works                                    │
//! │                                                                         │
//! │  User types: "floyd"                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lowercase substring match across: artist, album, genre                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Rows stream out of SQLite in (artist, album) order; the match          │
//! │  itself runs in Rust so case folding is Unicode-aware. A row            │
//! │  matching several fields still appears once.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use vinylflow_core::{validation, CoreError, InventoryItem, ItemPatch, NewItem};

/// Repository for inventory database operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.catalog();
///
/// let id = catalog.add(&new_item).await?;
/// let results = catalog.search("floyd", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

const ITEM_COLUMNS: &str = "id, artist, album, genre, year, price_cents, stock, date_added";

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Adds a new inventory item.
    ///
    /// Validates artist, album, price and stock before any write; assigns
    /// the id and sets `date_added`. A duplicate (artist, album) pair
    /// surfaces as a unique violation.
    ///
    /// ## Returns
    /// The id of the inserted item.
    pub async fn add(&self, item: &NewItem) -> DbResult<i64> {
        validation::validate_artist(&item.artist)?;
        validation::validate_album(&item.album)?;
        validation::validate_price(item.price)?;
        validation::validate_stock(item.stock)?;

        debug!(artist = %item.artist, album = %item.album, "Inserting record");

        let now = Utc::now();
        let price_cents = item.price.cents();

        let result = sqlx::query(
            r#"
            INSERT INTO records (artist, album, genre, year, price_cents, stock, date_added)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(item.artist.trim())
        .bind(item.album.trim())
        .bind(&item.genre)
        .bind(item.year)
        .bind(price_cents)
        .bind(item.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets an item by its id.
    pub async fn get(&self, id: i64) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM records WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists items ordered by (artist, album) ascending.
    ///
    /// ## Arguments
    /// * `limit` - Maximum results to return
    /// * `offset` - Rows to skip (for pagination)
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM records ORDER BY artist, album LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Searches items by case-insensitive substring on artist, album, or
    /// genre. Union of the three match sets, each record included once;
    /// result order matches `list`.
    ///
    /// An empty (or all-whitespace) query falls back to `list`.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<InventoryItem>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching records");

        if query.is_empty() {
            return self.list(limit, 0).await;
        }

        let needle = query.to_lowercase();

        // SQLite's lower() folds ASCII only ("BJÖRK" would never match
        // "björk"), so matching happens here with Rust's Unicode-aware
        // lowercasing. Plain substring match: wildcard characters in the
        // query are literal.
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM records ORDER BY artist, album"
        ))
        .fetch_all(&self.pool)
        .await?;

        let contains = |text: &str| text.to_lowercase().contains(&needle);
        let matches: Vec<InventoryItem> = items
            .into_iter()
            .filter(|item| {
                contains(&item.artist)
                    || contains(&item.album)
                    || item.genre.as_deref().is_some_and(contains)
            })
            .take(limit as usize)
            .collect();

        debug!(count = matches.len(), "Search returned records");
        Ok(matches)
    }

    /// Applies a partial update to an item.
    ///
    /// Only the fields present in the patch are validated and written;
    /// everything else is left untouched. `date_added` is immutable.
    ///
    /// ## Returns
    /// * `Ok(true)` - Item updated
    /// * `Ok(false)` - No item with that id
    pub async fn update(&self, id: i64, patch: &ItemPatch) -> DbResult<bool> {
        if let Some(artist) = &patch.artist {
            validation::validate_artist(artist)?;
        }
        if let Some(album) = &patch.album {
            validation::validate_album(album)?;
        }
        if let Some(price) = patch.price {
            validation::validate_price(price)?;
        }
        if let Some(stock) = patch.stock {
            validation::validate_stock(stock)?;
        }

        if patch.is_empty() {
            return Ok(self.get(id).await?.is_some());
        }

        debug!(id = %id, "Updating record");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE records SET ");
        let mut fields = qb.separated(", ");

        if let Some(artist) = &patch.artist {
            fields.push("artist = ");
            fields.push_bind_unseparated(artist.trim().to_string());
        }
        if let Some(album) = &patch.album {
            fields.push("album = ");
            fields.push_bind_unseparated(album.trim().to_string());
        }
        if let Some(genre) = &patch.genre {
            fields.push("genre = ");
            fields.push_bind_unseparated(genre.clone());
        }
        if let Some(year) = patch.year {
            fields.push("year = ");
            fields.push_bind_unseparated(year);
        }
        if let Some(price) = patch.price {
            fields.push("price_cents = ");
            fields.push_bind_unseparated(price.cents());
        }
        if let Some(stock) = patch.stock {
            fields.push("stock = ");
            fields.push_bind_unseparated(stock);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);

        let result = qb.build().execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard-deletes an item.
    ///
    /// Sale line items referencing it are left dangling; this is accepted
    /// (history keeps the captured price and quantity).
    ///
    /// ## Returns
    /// * `Ok(true)` - Item deleted
    /// * `Ok(false)` - No item with that id
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = %id, "Deleting record");

        let result = sqlx::query("DELETE FROM records WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Decrements an item's stock level.
    ///
    /// This is for administrative stock corrections only. Checkout must go
    /// through `SaleRepository::create_sale`, which composes the decrement
    /// with the sale rows in one transaction.
    ///
    /// ## Returns
    /// * `Ok(true)` - Stock decremented
    /// * `Ok(false)` - No item with that id
    /// * `Err(InsufficientStock)` - Current stock is less than `quantity`
    pub async fn decrease_stock(&self, id: i64, quantity: i64) -> DbResult<bool> {
        validation::validate_quantity(quantity)?;

        debug!(id = %id, quantity = %quantity, "Decreasing stock");

        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM records WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let available = match stock {
            Some(s) => s,
            None => return Ok(false),
        };

        if available < quantity {
            return Err(DbError::Core(CoreError::InsufficientStock {
                record_id: id,
                available,
                requested: quantity,
            }));
        }

        // Guarded so the CHECK constraint can never trip even if another
        // task slipped in between the read and the write.
        sqlx::query("UPDATE records SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2")
            .bind(id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;

        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vinylflow_core::Money;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn item(artist: &str, album: &str, genre: Option<&str>, cents: i64, stock: i64) -> NewItem {
        NewItem {
            artist: artist.to_string(),
            album: album.to_string(),
            genre: genre.map(str::to_string),
            year: Some(1979),
            price: Money::from_cents(cents),
            stock,
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let db = test_db().await;
        let catalog = db.catalog();

        let id = catalog
            .add(&item("Pink Floyd", "The Wall", Some("Rock"), 2500, 3))
            .await
            .unwrap();

        let fetched = catalog.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.artist, "Pink Floyd");
        assert_eq!(fetched.album, "The Wall");
        assert_eq!(fetched.genre.as_deref(), Some("Rock"));
        assert_eq!(fetched.price_cents, 2500);
        assert_eq!(fetched.stock, 3);

        assert!(catalog.get(id + 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_requires_fields() {
        let db = test_db().await;
        let catalog = db.catalog();

        let missing_artist = item("", "The Wall", None, 2500, 1);
        assert!(matches!(
            catalog.add(&missing_artist).await,
            Err(DbError::Core(CoreError::Validation(_)))
        ));

        let free = item("Pink Floyd", "The Wall", None, 0, 1);
        assert!(matches!(
            catalog.add(&free).await,
            Err(DbError::Core(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_artist_album_rejected() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .add(&item("Pink Floyd", "The Wall", None, 2500, 3))
            .await
            .unwrap();

        let dup = catalog
            .add(&item("Pink Floyd", "The Wall", Some("Rock"), 3000, 1))
            .await;
        assert!(matches!(dup, Err(DbError::UniqueViolation { .. })));

        // Same artist, different album is fine
        catalog
            .add(&item("Pink Floyd", "Animals", None, 2200, 2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_partial() {
        let db = test_db().await;
        let catalog = db.catalog();

        let id = catalog
            .add(&item("Pink Floyd", "The Wall", Some("Rock"), 2500, 3))
            .await
            .unwrap();

        let updated = catalog
            .update(
                id,
                &ItemPatch {
                    price: Some(Money::from_cents(2999)),
                    stock: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let fetched = catalog.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.price_cents, 2999);
        assert_eq!(fetched.stock, 10);
        // Unspecified fields untouched
        assert_eq!(fetched.artist, "Pink Floyd");
        assert_eq!(fetched.genre.as_deref(), Some("Rock"));

        // Unknown id reports false
        let missing = catalog
            .update(
                id + 999,
                &ItemPatch {
                    stock: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!missing);

        // Empty patch just reports existence
        assert!(catalog.update(id, &ItemPatch::default()).await.unwrap());
        assert!(!catalog
            .update(id + 999, &ItemPatch::default())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let catalog = db.catalog();

        let id = catalog
            .add(&item("Pink Floyd", "The Wall", None, 2500, 3))
            .await
            .unwrap();

        assert!(catalog.delete(id).await.unwrap());
        assert!(catalog.get(id).await.unwrap().is_none());
        assert!(!catalog.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_ordering_and_pagination() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .add(&item("Radiohead", "OK Computer", None, 2100, 4))
            .await
            .unwrap();
        catalog
            .add(&item("Pink Floyd", "The Wall", None, 2500, 3))
            .await
            .unwrap();
        catalog
            .add(&item("Pink Floyd", "Animals", None, 2200, 2))
            .await
            .unwrap();

        let all = catalog.list(10, 0).await.unwrap();
        let names: Vec<(&str, &str)> = all
            .iter()
            .map(|i| (i.artist.as_str(), i.album.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Pink Floyd", "Animals"),
                ("Pink Floyd", "The Wall"),
                ("Radiohead", "OK Computer"),
            ]
        );

        let page = catalog.list(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].album, "The Wall");
    }

    #[tokio::test]
    async fn test_search() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .add(&item("Pink Floyd", "The Wall", Some("Rock"), 2500, 3))
            .await
            .unwrap();
        catalog
            .add(&item("Miles Davis", "Kind of Blue", Some("Jazz"), 1900, 5))
            .await
            .unwrap();
        catalog
            .add(&item("The Rolling Stones", "Let It Bleed", Some("Rock"), 2300, 1))
            .await
            .unwrap();

        // Case-insensitive artist match
        let by_artist = catalog.search("FLOYD", 10).await.unwrap();
        assert_eq!(by_artist.len(), 1);
        assert_eq!(by_artist[0].artist, "Pink Floyd");

        // Genre match returns both rock albums, each exactly once,
        // in list order
        let by_genre = catalog.search("rock", 10).await.unwrap();
        let artists: Vec<&str> = by_genre.iter().map(|i| i.artist.as_str()).collect();
        assert_eq!(artists, vec!["Pink Floyd", "The Rolling Stones"]);

        // Every result is a subset of list() and contains the query
        let all = catalog.list(100, 0).await.unwrap();
        for found in &by_genre {
            assert!(all.contains(found));
        }

        // Limit bounds the result size
        let limited = catalog.search("rock", 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        // Empty query falls back to list
        let everything = catalog.search("   ", 10).await.unwrap();
        assert_eq!(everything.len(), 3);

        // No match
        assert!(catalog.search("polka", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .add(&item("BJÖRK", "Début", Some("Electronic"), 2100, 2))
            .await
            .unwrap();

        let by_artist = catalog.search("björk", 10).await.unwrap();
        assert_eq!(by_artist.len(), 1);
        assert_eq!(by_artist[0].artist, "BJÖRK");

        let by_album = catalog.search("DÉBUT", 10).await.unwrap();
        assert_eq!(by_album.len(), 1);
    }

    #[tokio::test]
    async fn test_decrease_stock() {
        let db = test_db().await;
        let catalog = db.catalog();

        let id = catalog
            .add(&item("Pink Floyd", "The Wall", None, 2500, 3))
            .await
            .unwrap();

        assert!(catalog.decrease_stock(id, 2).await.unwrap());
        assert_eq!(catalog.get(id).await.unwrap().unwrap().stock, 1);

        let err = catalog.decrease_stock(id, 5).await;
        assert!(matches!(
            err,
            Err(DbError::Core(CoreError::InsufficientStock {
                available: 1,
                requested: 5,
                ..
            }))
        ));
        // Stock unchanged after the failure
        assert_eq!(catalog.get(id).await.unwrap().unwrap().stock, 1);

        // Unknown id reports false
        assert!(!catalog.decrease_stock(id + 999, 1).await.unwrap());

        // Non-positive quantity is a validation error
        assert!(catalog.decrease_stock(id, 0).await.is_err());
    }
}
