//! # Sales Service
//!
//! Recording, reversing and querying sales.
//!
//! ## Recording
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_new_sale ── ValidationError (no store access)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  look up item ─────── NotFound                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stock >= quantity? ─ InsufficientStock                                 │
//! │       │                                                                 │
//! │       ├── Atomic:      decrement + sale + "out" entry, one transaction │
//! │       │                (the conditional decrement re-checks stock)     │
//! │       │                                                                 │
//! │       └── BestEffort:  insert sale ── fails → Persistence              │
//! │                        post "out" movement                              │
//! │                          ├── stock gone → delete sale, InsufficientStock│
//! │                          └── store error → log, sale still returned    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reversal
//! ```text
//! fetch sale ── NotFound
//!     ├── Atomic:      delete + restore + "in" entry, one transaction
//!     └── BestEffort:  delete ── fails → Persistence
//!                      post "in" movement ── fails → PartialFailure
//! ```

use tracing::{error, info, warn};

use stockroom_core::report::{sales_csv, SaleStats};
use stockroom_core::validation::{validate_new_sale, validate_sales_query, NewSaleRequest, SalesQuery};
use stockroom_core::{InventoryItem, LedgerEntry, SaleRecord, SaleWithItem, ValidationError};
use stockroom_db::{Database, DbError};

use crate::config::WriteMode;
use crate::error::{ServiceError, ServiceResult};

/// Sales matching a query, with statistics over exactly those sales.
#[derive(Debug, Clone)]
pub struct SalesReport {
    pub sales: Vec<SaleWithItem>,
    pub stats: SaleStats,
}

#[derive(Debug, Clone)]
pub struct SalesService {
    db: Database,
    mode: WriteMode,
}

impl SalesService {
    pub fn new(db: Database, mode: WriteMode) -> Self {
        SalesService { db, mode }
    }

    /// Records a sale and returns it joined with its item.
    pub async fn record_sale(&self, req: &NewSaleRequest) -> ServiceResult<SaleWithItem> {
        let new = validate_new_sale(req)?;

        let item = self
            .db
            .inventory()
            .get_by_id(&new.item_id)
            .await?
            .ok_or_else(|| ServiceError::item_not_found(&new.item_id))?;

        if !item.can_sell(new.quantity) {
            return Err(ServiceError::insufficient_stock(
                &item.name,
                item.current_stock,
                new.quantity,
            ));
        }

        let sale = SaleRecord::new(&item.id, new.quantity, new.unit_price);

        let recorded = match self.mode {
            WriteMode::Atomic => self
                .db
                .sales()
                .record_atomic(&sale)
                .await
                .map_err(|e| with_item_name(e, &item))?,
            WriteMode::BestEffort => self.record_best_effort(sale, &item).await?,
        };

        info!(
            sale_id = %recorded.sale.id,
            item_id = %item.id,
            quantity = recorded.sale.quantity,
            total = %recorded.sale.total(),
            mode = %self.mode,
            "Sale recorded"
        );

        Ok(recorded)
    }

    async fn record_best_effort(
        &self,
        sale: SaleRecord,
        item: &InventoryItem,
    ) -> ServiceResult<SaleWithItem> {
        self.db
            .sales()
            .insert(&sale)
            .await
            .map_err(ServiceError::Persistence)?;

        let entry = LedgerEntry::for_sale(&sale, &item.name);
        match self.db.ledger().post(&entry).await {
            Ok(()) => {}
            Err(DbError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                // Another sale took the stock between the check and the post
                warn!(sale_id = %sale.id, item_id = %item.id, available, "Stock gone before posting, withdrawing sale");
                if let Err(e) = self.db.sales().delete(&sale.id).await {
                    error!(sale_id = %sale.id, error = %e, "Failed to withdraw sale without stock");
                    return Err(ServiceError::PartialFailure {
                        message: format!(
                            "Sale {} was recorded without stock and could not be withdrawn; \
                             manual reconciliation needed",
                            sale.id
                        ),
                        source: e,
                    });
                }
                return Err(ServiceError::insufficient_stock(&item.name, available, requested));
            }
            Err(e) => {
                error!(
                    sale_id = %sale.id,
                    item_id = %item.id,
                    error = %e,
                    "Sale recorded but stock ledger update failed"
                );
            }
        }

        Ok(SaleWithItem {
            sale,
            item: Some(item.summary()),
        })
    }

    /// Deletes a sale and puts its stock back.
    ///
    /// Returns the compensating ledger entry.
    pub async fn reverse_sale(&self, sale_id: Option<&str>) -> ServiceResult<LedgerEntry> {
        let sale_id = sale_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ValidationError::Required {
                field: "id".to_string(),
            })?;

        let sale = self
            .db
            .sales()
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| ServiceError::sale_not_found(sale_id))?;

        let entry = match self.mode {
            WriteMode::Atomic => self.db.sales().reverse_atomic(&sale).await?,
            WriteMode::BestEffort => {
                self.db.sales().delete(&sale.id).await?;

                let entry = LedgerEntry::for_reversal(&sale);
                if let Err(e) = self.db.ledger().post(&entry).await {
                    error!(
                        sale_id = %sale.id,
                        item_id = %sale.item_id,
                        quantity = sale.quantity,
                        error = %e,
                        "Sale deleted but stock restore failed"
                    );
                    return Err(ServiceError::PartialFailure {
                        message: "Sale deleted but failed to restore stock; \
                                  manual reconciliation needed"
                            .to_string(),
                        source: e,
                    });
                }
                entry
            }
        };

        info!(sale_id = %sale.id, item_id = %sale.item_id, quantity = sale.quantity, "Sale reversed");
        Ok(entry)
    }

    /// Sales matching the query, newest first, with statistics.
    pub async fn query_sales(&self, query: &SalesQuery) -> ServiceResult<SalesReport> {
        let filter = validate_sales_query(query)?;
        let sales = self
            .db
            .sales()
            .list(&filter)
            .await
            .map_err(ServiceError::Persistence)?;
        let stats = SaleStats::from_joined(&sales);

        Ok(SalesReport { sales, stats })
    }

    /// The CSV report of the sales matching the query.
    pub async fn export_csv(&self, query: &SalesQuery) -> ServiceResult<String> {
        let report = self.query_sales(query).await?;
        Ok(sales_csv(&report.sales)?)
    }
}

/// Attaches the item's display name to stock errors raised by the store.
fn with_item_name(err: DbError, item: &InventoryItem) -> ServiceError {
    match err {
        DbError::InsufficientStock {
            available,
            requested,
            ..
        } => ServiceError::insufficient_stock(&item.name, available, requested),
        other => ServiceError::from(other),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
