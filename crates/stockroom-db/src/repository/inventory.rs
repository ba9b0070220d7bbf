//! # Inventory Repository
//!
//! Database operations for inventory items and the stock counter.
//!
//! ## Stock Movement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     apply_movement(conn, item, type, n)                 │
//! │                                                                         │
//! │  In:   UPDATE ... SET current_stock = current_stock + n WHERE id = ?   │
//! │        0 rows → NotFound                                                │
//! │                                                                         │
//! │  Out:  UPDATE ... SET current_stock = current_stock - n                │
//! │        WHERE id = ? AND current_stock >= n                              │
//! │        0 rows → re-read: missing → NotFound                             │
//! │                          present → InsufficientStock { available }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers always pair a movement with its ledger entry inside one
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::insert_entry;
use stockroom_core::validation::NewItem;
use stockroom_core::{InventoryItem, LedgerEntry, LedgerEntryType, Money, OPENING_STOCK_NOTE};

const ITEM_COLUMNS: &str = r#"
    id, name, category, unit, current_stock,
    selling_price_cents, unit_price_cents, created_at, updated_at
"#;

/// Repository for inventory item database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Lists all items ordered by name.
    pub async fn list(&self) -> DbResult<Vec<InventoryItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY name, id");
        let items = sqlx::query_as::<_, InventoryItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets an item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1");
        let item = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Items with `current_stock < threshold`, emptiest first.
    pub async fn list_low_stock(&self, threshold: i64) -> DbResult<Vec<InventoryItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE current_stock < ?1 ORDER BY current_stock, name"
        );
        let items = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Counts items (used by the seeder to skip populated databases).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Creates an item.
    ///
    /// ## Opening Stock
    /// A positive opening stock is written as an "in" ledger entry in the
    /// same transaction, so the ledger explains the counter from day one.
    /// The entry is valued at the purchase price when one is known.
    pub async fn create(&self, new: &NewItem) -> DbResult<InventoryItem> {
        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            category: new.category.clone(),
            unit: new.unit.clone(),
            current_stock: new.opening_stock,
            selling_price_cents: new.selling_price.map(|p| p.cents()),
            unit_price_cents: new.unit_price.map(|p| p.cents()),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, stock = item.current_stock, "Creating item");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, name, category, unit, current_stock,
                selling_price_cents, unit_price_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.unit)
        .bind(item.current_stock)
        .bind(item.selling_price_cents)
        .bind(item.unit_price_cents)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        if item.current_stock > 0 {
            let value = new
                .unit_price
                .unwrap_or_else(Money::zero)
                .checked_multiply_quantity(item.current_stock)
                .ok_or_else(|| DbError::ConstraintViolation {
                    message: "opening stock value is too large".to_string(),
                })?;
            let entry = LedgerEntry::new(
                item.id.clone(),
                LedgerEntryType::In,
                item.current_stock,
                value,
                OPENING_STOCK_NOTE,
            );
            insert_entry(&mut *tx, &entry).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(item)
    }
}

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

/// Reads an item on the given connection; `NotFound` if absent.
pub(crate) async fn fetch_item(conn: &mut SqliteConnection, id: &str) -> DbResult<InventoryItem> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1");
    sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Item", id))
}

/// Moves `quantity` units of stock in or out of an item.
pub(crate) async fn apply_movement(
    conn: &mut SqliteConnection,
    item_id: &str,
    entry_type: LedgerEntryType,
    quantity: i64,
    at: DateTime<Utc>,
) -> DbResult<()> {
    debug!(item_id = %item_id, entry_type = entry_type.as_str(), quantity, "Applying stock movement");

    let result = match entry_type {
        LedgerEntryType::In => {
            sqlx::query(
                r#"
                UPDATE inventory_items
                SET current_stock = current_stock + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(item_id)
            .bind(quantity)
            .bind(at)
            .execute(&mut *conn)
            .await?
        }
        LedgerEntryType::Out => {
            sqlx::query(
                r#"
                UPDATE inventory_items
                SET current_stock = current_stock - ?2, updated_at = ?3
                WHERE id = ?1 AND current_stock >= ?2
                "#,
            )
            .bind(item_id)
            .bind(quantity)
            .bind(at)
            .execute(&mut *conn)
            .await?
        }
    };

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let available: Option<i64> =
        sqlx::query_scalar("SELECT current_stock FROM inventory_items WHERE id = ?1")
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await?;

    match (entry_type, available) {
        (LedgerEntryType::Out, Some(available)) => Err(DbError::InsufficientStock {
            item_id: item_id.to_string(),
            available,
            requested: quantity,
        }),
        _ => Err(DbError::not_found("Item", item_id)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_item(name: &str, category: &str, stock: i64) -> NewItem {
        NewItem {
            name: name.to_string(),
            category: category.to_string(),
            unit: "pcs".to_string(),
            opening_stock: stock,
            selling_price: Some(Money::from_cents(10000)),
            unit_price: Some(Money::from_cents(6000)),
        }
    }

    #[tokio::test]
    async fn test_create_writes_opening_stock_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db.inventory().create(&new_item("Cola", "Beverages", 5)).await.unwrap();

        let loaded = db.inventory().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_stock, 5);
        assert_eq!(loaded.selling_price_cents, Some(10000));

        let entries = db.ledger().list_for_item(&item.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, LedgerEntryType::In);
        assert_eq!(entries[0].quantity, 5);
        assert_eq!(entries[0].total_amount_cents, 30000);
        assert_eq!(entries[0].note, OPENING_STOCK_NOTE);
    }

    #[tokio::test]
    async fn test_create_without_stock_writes_no_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db.inventory().create(&new_item("Chips", "Snacks", 0)).await.unwrap();

        assert!(db.ledger().list_for_item(&item.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_overflowing_opening_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut item = new_item("Gold", "Metals", 1_000);
        item.unit_price = Some(Money::from_cents(i64::MAX / 10));

        let err = db.inventory().create(&item).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
        assert_eq!(db.inventory().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_low_stock_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory();
        repo.create(&new_item("Water", "Beverages", 40)).await.unwrap();
        repo.create(&new_item("Apple", "Grocery", 3)).await.unwrap();
        repo.create(&new_item("Milk", "Dairy", 10)).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Apple", "Milk", "Water"]);

        let low = repo.list_low_stock(10).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Apple");
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_out_movement_is_conditional() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db.inventory().create(&new_item("Cola", "Beverages", 5)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        apply_movement(&mut conn, &item.id, LedgerEntryType::Out, 5, Utc::now())
            .await
            .unwrap();

        let err = apply_movement(&mut conn, &item.id, LedgerEntryType::Out, 1, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::InsufficientStock { available: 0, requested: 1, .. }
        ));

        let err = apply_movement(&mut conn, "missing", LedgerEntryType::In, 1, Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_item_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        assert!(fetch_item(&mut conn, "nope").await.unwrap_err().is_not_found());
    }
}
