//! Service layer: validated workflows over the database.
//!
//! - [`sales`] - record, reverse, query and export sales
//! - [`inventory`] - items, restocking, low stock, ledger, reconciliation
//! - [`expenses`] - expense list and entry
//! - [`overview`] - dashboard figures

pub mod expenses;
pub mod inventory;
pub mod overview;
pub mod sales;

#[cfg(test)]
pub(crate) mod testing {
    use stockroom_core::validation::NewItem;
    use stockroom_core::{InventoryItem, Money};
    use stockroom_db::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn item(db: &Database, name: &str, category: &str, stock: i64) -> InventoryItem {
        db.inventory()
            .create(&NewItem {
                name: name.to_string(),
                category: category.to_string(),
                unit: "pcs".to_string(),
                opening_stock: stock,
                selling_price: Some(Money::from_cents(10000)),
                unit_price: Some(Money::from_cents(6000)),
            })
            .await
            .unwrap()
    }

    pub async fn drop_table(db: &Database, table: &str) {
        sqlx::query(&format!("DROP TABLE {table}"))
            .execute(db.pool())
            .await
            .unwrap();
    }
}
