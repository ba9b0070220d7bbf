//! # Inventory Service
//!
//! Item management and stock bookkeeping outside of sales: creating items
//! with opening stock, restocking, low-stock listing, per-item ledger and
//! reconciliation of counters against the ledger.

use tracing::{info, warn};

use stockroom_core::report::{reconcile, StockDiscrepancy};
use stockroom_core::validation::{validate_new_item, validate_restock, NewItemRequest, RestockRequest};
use stockroom_core::{InventoryItem, LedgerEntry, LedgerEntryType, Money, ValidationError};
use stockroom_db::Database;

use crate::error::{ServiceError, ServiceResult};

const RESTOCK_NOTE: &str = "Restock";

#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    low_stock_threshold: i64,
}

impl InventoryService {
    pub fn new(db: Database, low_stock_threshold: i64) -> Self {
        InventoryService {
            db,
            low_stock_threshold,
        }
    }

    /// All items, ordered by name.
    pub async fn list_items(&self) -> ServiceResult<Vec<InventoryItem>> {
        self.db
            .inventory()
            .list()
            .await
            .map_err(ServiceError::Persistence)
    }

    pub async fn create_item(&self, req: &NewItemRequest) -> ServiceResult<InventoryItem> {
        let new = validate_new_item(req)?;
        let item = self
            .db
            .inventory()
            .create(&new)
            .await
            .map_err(ServiceError::Persistence)?;

        info!(item_id = %item.id, name = %item.name, stock = item.current_stock, "Item created");
        Ok(item)
    }

    /// Adds stock to an item and returns the item as it is afterwards.
    pub async fn restock_item(&self, item_id: &str, req: &RestockRequest) -> ServiceResult<InventoryItem> {
        let restock = validate_restock(req)?;

        let item = self.find_item(item_id).await?;
        let value = item
            .unit_price_cents
            .map(Money::from_cents)
            .unwrap_or_else(Money::zero)
            .checked_multiply_quantity(restock.quantity)
            .ok_or_else(|| ValidationError::invalid_format("quantity", "stock value is too large"))?;
        let entry = LedgerEntry::new(
            item.id.clone(),
            LedgerEntryType::In,
            restock.quantity,
            value,
            restock.note.unwrap_or_else(|| RESTOCK_NOTE.to_string()),
        );

        self.db.ledger().post(&entry).await?;
        info!(item_id = %item.id, quantity = restock.quantity, "Item restocked");

        self.find_item(item_id).await
    }

    /// Items below the configured threshold, emptiest first.
    pub async fn low_stock_items(&self) -> ServiceResult<Vec<InventoryItem>> {
        self.db
            .inventory()
            .list_low_stock(self.low_stock_threshold)
            .await
            .map_err(ServiceError::Persistence)
    }

    /// Ledger of one item, newest first.
    pub async fn ledger_for(&self, item_id: &str) -> ServiceResult<Vec<LedgerEntry>> {
        self.find_item(item_id).await?;
        self.db
            .ledger()
            .list_for_item(item_id)
            .await
            .map_err(ServiceError::Persistence)
    }

    /// Items whose counter disagrees with Σ in − Σ out of their ledger.
    pub async fn reconcile(&self) -> ServiceResult<Vec<StockDiscrepancy>> {
        let items = self.list_items().await?;
        let balances = self
            .db
            .ledger()
            .balances()
            .await
            .map_err(ServiceError::Persistence)?;

        let discrepancies = reconcile(&items, &balances);
        if !discrepancies.is_empty() {
            warn!(count = discrepancies.len(), "Stock counters disagree with the ledger");
        }
        Ok(discrepancies)
    }

    async fn find_item(&self, item_id: &str) -> ServiceResult<InventoryItem> {
        self.db
            .inventory()
            .get_by_id(item_id)
            .await
            .map_err(ServiceError::Persistence)?
            .ok_or_else(|| ServiceError::item_not_found(item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteMode;
    use crate::services::sales::SalesService;
    use crate::services::testing::{database, drop_table, item};
    use stockroom_core::money::DecimalInput;
    use stockroom_core::validation::NewSaleRequest;
    use stockroom_core::CoreError;

    fn restock(quantity: i64) -> RestockRequest {
        RestockRequest {
            quantity: Some(quantity),
            note: None,
        }
    }

    #[tokio::test]
    async fn test_create_item_validates() {
        let service = InventoryService::new(database().await, 10);

        let err = service
            .create_item(&NewItemRequest {
                name: Some("Cola".to_string()),
                ..NewItemRequest::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let created = service
            .create_item(&NewItemRequest {
                name: Some("Cola".to_string()),
                category: Some("Beverages".to_string()),
                unit: Some("bottle".to_string()),
                opening_stock: Some(12),
                selling_price: Some(DecimalInput::new("1.50")),
                unit_price: None,
            })
            .await
            .unwrap();
        assert_eq!(created.current_stock, 12);
        assert_eq!(created.effective_price(), Some(Money::from_cents(150)));
    }

    #[tokio::test]
    async fn test_restock_adds_stock_and_entry() {
        let db = database().await;
        let cola = item(&db, "Cola", "Beverages", 2).await;
        let service = InventoryService::new(db.clone(), 10);

        let updated = service.restock_item(&cola.id, &restock(8)).await.unwrap();

        assert_eq!(updated.current_stock, 10);
        let entries = service.ledger_for(&cola.id).await.unwrap();
        assert_eq!(entries[0].note, RESTOCK_NOTE);
        assert_eq!(entries[0].quantity, 8);
        assert_eq!(entries[0].total_amount_cents, 8 * 6000);
    }

    #[tokio::test]
    async fn test_restock_unknown_item_and_bad_quantity() {
        let service = InventoryService::new(database().await, 10);

        let err = service.restock_item("missing", &restock(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::ItemNotFound(_))));

        let err = service.restock_item("missing", &restock(0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_restock_rejects_overflowing_value() {
        let db = database().await;
        let gold = db
            .inventory()
            .create(&stockroom_core::validation::NewItem {
                name: "Gold".to_string(),
                category: "Metals".to_string(),
                unit: "bar".to_string(),
                opening_stock: 0,
                selling_price: None,
                unit_price: Some(Money::from_cents(i64::MAX / 10)),
            })
            .await
            .unwrap();
        let service = InventoryService::new(db, 10);

        let err = service.restock_item(&gold.id, &restock(1_000)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let after = service.find_item(&gold.id).await.unwrap();
        assert_eq!(after.current_stock, 0);
        assert!(service.ledger_for(&gold.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_uses_threshold() {
        let db = database().await;
        item(&db, "Cola", "Beverages", 9).await;
        item(&db, "Chips", "Snacks", 10).await;
        item(&db, "Milk", "Dairy", 0).await;
        let service = InventoryService::new(db, 10);

        let names: Vec<String> = service
            .low_stock_items()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Milk", "Cola"]);
    }

    #[tokio::test]
    async fn test_reconcile_clean_after_sales_and_reversals() {
        let db = database().await;
        let cola = item(&db, "Cola", "Beverages", 10).await;
        let sales = SalesService::new(db.clone(), WriteMode::Atomic);
        let sold = sales
            .record_sale(&NewSaleRequest {
                item_id: Some(cola.id.clone()),
                quantity: Some(4),
                unit_price: Some(DecimalInput::new("1")),
            })
            .await
            .unwrap();
        sales.reverse_sale(Some(&sold.sale.id)).await.unwrap();
        let service = InventoryService::new(db, 10);
        service.restock_item(&cola.id, &restock(5)).await.unwrap();

        assert!(service.reconcile().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_reports_best_effort_drift() {
        let db = database().await;
        let cola = item(&db, "Cola", "Beverages", 10).await;

        // Counter moved behind the ledger's back
        sqlx::query("UPDATE inventory_items SET current_stock = 7 WHERE id = ?1")
            .bind(&cola.id)
            .execute(db.pool())
            .await
            .unwrap();

        let found = InventoryService::new(db, 10).reconcile().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].counter_stock, 7);
        assert_eq!(found[0].ledger_stock, 10);
    }

    #[tokio::test]
    async fn test_store_failure_is_persistence_error() {
        let db = database().await;
        drop_table(&db, "ledger_entries").await;
        let service = InventoryService::new(db, 10);

        let err = service.reconcile().await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
    }
}
