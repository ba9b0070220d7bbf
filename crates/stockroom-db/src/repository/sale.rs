//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD (record_atomic)                     one transaction          │
//! │     ├── current_stock -= qty WHERE current_stock >= qty  (write first) │
//! │     ├── read item name                                                  │
//! │     ├── INSERT INTO sales                                              │
//! │     └── INSERT INTO ledger_entries ('out', "Sale - <name>")           │
//! │                                                                         │
//! │  2. REVERSE (reverse_atomic)                   one transaction          │
//! │     ├── DELETE FROM sales                                              │
//! │     ├── current_stock += qty                                           │
//! │     └── INSERT INTO ledger_entries ('in', "Sale reversal ...")        │
//! │                                                                         │
//! │  insert() / delete() are the single-step writes used when the server   │
//! │  runs in best-effort mode and posts the ledger movement separately.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::inventory::{apply_movement, fetch_item};
use crate::repository::ledger::insert_entry;
use stockroom_core::validation::SalesFilter;
use stockroom_core::{ItemSummary, LedgerEntry, LedgerEntryType, SaleRecord, SaleWithItem};

/// A sale row left-joined with its item.
#[derive(Debug, sqlx::FromRow)]
struct JoinedSaleRow {
    id: String,
    item_id: String,
    quantity: i64,
    unit_price_cents: i64,
    total_cents: i64,
    sold_at: DateTime<Utc>,
    item_name: Option<String>,
    item_category: Option<String>,
}

impl From<JoinedSaleRow> for SaleWithItem {
    fn from(row: JoinedSaleRow) -> Self {
        let item = match (row.item_name, row.item_category) {
            (Some(name), Some(category)) => Some(ItemSummary {
                id: row.item_id.clone(),
                name,
                category,
            }),
            _ => None,
        };

        SaleWithItem {
            sale: SaleRecord {
                id: row.id,
                item_id: row.item_id,
                quantity: row.quantity,
                unit_price_cents: row.unit_price_cents,
                total_cents: row.total_cents,
                sold_at: row.sold_at,
            },
            item,
        }
    }
}

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

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, item_id, quantity, unit_price_cents, total_cents, sold_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Sales matching the filter, joined with their items, newest first.
    ///
    /// ## Filter Semantics
    /// - `from`: `sold_at >= from`
    /// - `until`: `sold_at < until` (exclusive; callers pass the start of
    ///   the day after the last included day)
    /// - `category`: exact match on the joined item's category; sales whose
    ///   item no longer exists never match a category
    pub async fn list(&self, filter: &SalesFilter) -> DbResult<Vec<SaleWithItem>> {
        debug!(
            from = ?filter.from,
            until = ?filter.until,
            category = ?filter.category,
            "Querying sales"
        );

        let rows = sqlx::query_as::<_, JoinedSaleRow>(
            r#"
            SELECT
                s.id,
                s.item_id,
                s.quantity,
                s.unit_price_cents,
                s.total_cents,
                s.sold_at,
                i.name AS item_name,
                i.category AS item_category
            FROM sales s
            LEFT JOIN inventory_items i ON i.id = s.item_id
            WHERE (?1 IS NULL OR s.sold_at >= ?1)
              AND (?2 IS NULL OR s.sold_at < ?2)
              AND (?3 IS NULL OR i.category = ?3)
            ORDER BY s.sold_at DESC, s.rowid DESC
            "#,
        )
        .bind(filter.from)
        .bind(filter.until)
        .bind(filter.category.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleWithItem::from).collect())
    }

    /// Every sale, unjoined (overview figures).
    pub async fn list_all(&self) -> DbResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, item_id, quantity, unit_price_cents, total_cents, sold_at
            FROM sales
            ORDER BY sold_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Inserts a sale without touching stock or the ledger.
    pub async fn insert(&self, sale: &SaleRecord) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_sale(&mut conn, sale).await
    }

    /// Deletes a sale without touching stock or the ledger.
    ///
    /// ## Errors
    /// `NotFound` when no row was deleted.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_sale(&mut conn, id).await
    }

    /// Records a sale as one unit: stock decrement, sale row, "out" entry.
    ///
    /// ## Returns
    /// The sale joined with the item it was recorded against.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown item
    /// - `InsufficientStock` when the stock on hand at commit time is short
    /// - anything else means nothing was written
    pub async fn record_atomic(&self, sale: &SaleRecord) -> DbResult<SaleWithItem> {
        debug!(id = %sale.id, item_id = %sale.item_id, quantity = sale.quantity, "Recording sale");

        let mut tx = self.pool.begin().await?;

        // The conditional UPDATE must be the first statement: a deferred
        // transaction that reads first cannot upgrade to the write lock
        // once another writer has committed, and fails with SQLITE_BUSY
        // instead of waiting.
        apply_movement(
            &mut *tx,
            &sale.item_id,
            LedgerEntryType::Out,
            sale.quantity,
            sale.sold_at,
        )
        .await?;
        let item = fetch_item(&mut *tx, &sale.item_id).await?;
        insert_sale(&mut *tx, sale).await?;
        insert_entry(&mut *tx, &LedgerEntry::for_sale(sale, &item.name)).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(SaleWithItem {
            sale: sale.clone(),
            item: Some(item.summary()),
        })
    }

    /// Reverses a sale as one unit: delete, stock restore, "in" entry.
    ///
    /// ## Returns
    /// The compensating ledger entry.
    pub async fn reverse_atomic(&self, sale: &SaleRecord) -> DbResult<LedgerEntry> {
        debug!(id = %sale.id, item_id = %sale.item_id, "Reversing sale");

        let entry = LedgerEntry::for_reversal(sale);
        let mut tx = self.pool.begin().await?;

        delete_sale(&mut *tx, &sale.id).await?;
        apply_movement(
            &mut *tx,
            &sale.item_id,
            LedgerEntryType::In,
            sale.quantity,
            entry.logged_at,
        )
        .await?;
        insert_entry(&mut *tx, &entry).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(entry)
    }
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &SaleRecord) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, item_id, quantity, unit_price_cents, total_cents, sold_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.item_id)
    .bind(sale.quantity)
    .bind(sale.unit_price_cents)
    .bind(sale.total_cents)
    .bind(sale.sold_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn delete_sale(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{NaiveDate, TimeZone};
    use stockroom_core::validation::{start_of_day, NewItem};
    use stockroom_core::{InventoryItem, Money};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn item(db: &Database, name: &str, category: &str, stock: i64) -> InventoryItem {
        db.inventory()
            .create(&NewItem {
                name: name.to_string(),
                category: category.to_string(),
                unit: "pcs".to_string(),
                opening_stock: stock,
                selling_price: Some(Money::from_cents(10000)),
                unit_price: None,
            })
            .await
            .unwrap()
    }

    fn sale_at(item_id: &str, qty: i64, at: DateTime<Utc>) -> SaleRecord {
        let mut sale = SaleRecord::new(item_id, qty, Money::from_cents(100));
        sale.sold_at = at;
        sale
    }

    #[tokio::test]
    async fn test_record_atomic_moves_stock_and_ledger() {
        let db = setup().await;
        let cola = item(&db, "Cola", "Beverages", 5).await;

        let sale = SaleRecord::new(&cola.id, 5, Money::from_cents(10000));
        let recorded = db.sales().record_atomic(&sale).await.unwrap();

        assert_eq!(recorded.sale.total_cents, 50000);
        assert_eq!(recorded.item.unwrap().name, "Cola");

        let stock = db.inventory().get_by_id(&cola.id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 0);

        let entries = db.ledger().list_for_item(&cola.id).await.unwrap();
        assert_eq!(entries[0].entry_type, LedgerEntryType::Out);
        assert_eq!(entries[0].note, "Sale - Cola");
        assert_eq!(entries[0].total_amount_cents, 50000);
    }

    #[tokio::test]
    async fn test_record_atomic_insufficient_writes_nothing() {
        let db = setup().await;
        let cola = item(&db, "Cola", "Beverages", 2).await;

        let sale = SaleRecord::new(&cola.id, 3, Money::from_cents(100));
        let err = db.sales().record_atomic(&sale).await.unwrap_err();

        assert!(matches!(err, DbError::InsufficientStock { available: 2, requested: 3, .. }));
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
        assert_eq!(db.ledger().list_for_item(&cola.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reverse_atomic_restores_stock() {
        let db = setup().await;
        let cola = item(&db, "Cola", "Beverages", 5).await;
        let sale = SaleRecord::new(&cola.id, 2, Money::from_cents(150));
        db.sales().record_atomic(&sale).await.unwrap();

        let entry = db.sales().reverse_atomic(&sale).await.unwrap();

        assert_eq!(entry.entry_type, LedgerEntryType::In);
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.total_amount_cents, 300);
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
        let stock = db.inventory().get_by_id(&cola.id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 5);

        // A second reversal finds nothing to delete and changes nothing
        let err = db.sales().reverse_atomic(&sale).await.unwrap_err();
        assert!(err.is_not_found());
        let stock = db.inventory().get_by_id(&cola.id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_on_file_database_all_commit() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("shop.db")).max_connections(8))
            .await
            .unwrap();
        let cola = item(&db, "Cola", "Beverages", 100).await;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let db = db.clone();
                let sale = SaleRecord::new(&cola.id, 1, Money::from_cents(100));
                tokio::spawn(async move { db.sales().record_atomic(&sale).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stock = db.inventory().get_by_id(&cola.id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 80);
        assert_eq!(db.sales().list_all().await.unwrap().len(), 20);
        // Opening entry plus one "out" per sale
        assert_eq!(db.ledger().list_for_item(&cola.id).await.unwrap().len(), 21);
        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("shop.db")).max_connections(8))
            .await
            .unwrap();
        let cola = item(&db, "Cola", "Beverages", 5).await;

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let db = db.clone();
                let sale = SaleRecord::new(&cola.id, 1, Money::from_cents(100));
                tokio::spawn(async move { db.sales().record_atomic(&sale).await })
            })
            .collect();

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(e) => assert!(matches!(e, DbError::InsufficientStock { .. }), "{e}"),
            }
        }

        assert_eq!(sold, 5);
        let stock = db.inventory().get_by_id(&cola.id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 0);
        db.close().await;
    }

    #[tokio::test]
    async fn test_delete_missing_sale_is_not_found() {
        let db = setup().await;
        assert!(db.sales().delete("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_date_bounds_are_day_inclusive() {
        let db = setup().await;
        let cola = item(&db, "Cola", "Beverages", 0).await;
        let repo = db.sales();

        let last_second = Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 59).unwrap();
        let next_midnight = Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap();
        let first_midnight = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        repo.insert(&sale_at(&cola.id, 1, last_second)).await.unwrap();
        repo.insert(&sale_at(&cola.id, 1, next_midnight)).await.unwrap();
        repo.insert(&sale_at(&cola.id, 1, first_midnight)).await.unwrap();

        let from = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let to_next = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        let filter = SalesFilter {
            from: Some(start_of_day(from)),
            until: Some(start_of_day(to_next)),
            category: None,
        };

        let rows = repo.list(&filter).await.unwrap();
        let times: Vec<DateTime<Utc>> = rows.iter().map(|r| r.sale.sold_at).collect();
        assert_eq!(times, vec![last_second, first_midnight]);
    }

    #[tokio::test]
    async fn test_list_filters_category_and_orders_newest_first() {
        let db = setup().await;
        let cola = item(&db, "Cola", "Beverages", 0).await;
        let chips = item(&db, "Chips", "Snacks", 0).await;
        let repo = db.sales();

        let t = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        repo.insert(&sale_at(&cola.id, 1, t)).await.unwrap();
        repo.insert(&sale_at(&chips.id, 2, t + chrono::Duration::minutes(1))).await.unwrap();
        repo.insert(&sale_at(&cola.id, 3, t + chrono::Duration::minutes(2))).await.unwrap();

        let all = repo.list(&SalesFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].sale.quantity, 3);
        assert_eq!(all[2].sale.quantity, 1);

        let drinks = repo
            .list(&SalesFilter {
                category: Some("Beverages".to_string()),
                ..SalesFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(drinks.len(), 2);
        assert!(drinks
            .iter()
            .all(|r| r.item.as_ref().map(|i| i.category.as_str()) == Some("Beverages")));
    }
}
