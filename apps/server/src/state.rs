//! Shared application state.

use std::sync::Arc;

use stockroom_db::Database;

use crate::config::ServerConfig;
use crate::services::expenses::ExpenseService;
use crate::services::inventory::InventoryService;
use crate::services::overview::OverviewService;
use crate::services::sales::SalesService;

/// State handed to every handler. The database handle is created once at
/// startup and passed in here; handlers never open their own.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    pub fn sales(&self) -> SalesService {
        SalesService::new(self.db.clone(), self.config.sale_write_mode)
    }

    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.db.clone(), self.config.low_stock_threshold)
    }

    pub fn expenses(&self) -> ExpenseService {
        ExpenseService::new(self.db.clone())
    }

    pub fn overview(&self) -> OverviewService {
        OverviewService::new(self.db.clone(), self.config.low_stock_threshold)
    }
}
