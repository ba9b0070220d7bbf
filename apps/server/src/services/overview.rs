//! # Overview Service
//!
//! Headline figures of the dashboard, computed from full tables.

use chrono::{DateTime, Utc};

use stockroom_core::report::Overview;
use stockroom_db::Database;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct OverviewService {
    db: Database,
    low_stock_threshold: i64,
}

impl OverviewService {
    pub fn new(db: Database, low_stock_threshold: i64) -> Self {
        OverviewService {
            db,
            low_stock_threshold,
        }
    }

    /// Overview as of `now`.
    pub async fn overview(&self, now: DateTime<Utc>) -> ServiceResult<Overview> {
        let sales = self.db.sales().list_all().await.map_err(ServiceError::Persistence)?;
        let expenses = self.db.expenses().list().await.map_err(ServiceError::Persistence)?;
        let items = self.db.inventory().list().await.map_err(ServiceError::Persistence)?;

        Ok(Overview::compute(
            &sales,
            &expenses,
            &items,
            now,
            self.low_stock_threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteMode;
    use crate::services::expenses::ExpenseService;
    use crate::services::sales::SalesService;
    use crate::services::testing::{database, item};
    use stockroom_core::money::DecimalInput;
    use stockroom_core::validation::{NewExpenseRequest, NewSaleRequest};

    #[tokio::test]
    async fn test_overview_combines_sales_expenses_and_stock() {
        let db = database().await;
        let cola = item(&db, "Cola", "Beverages", 12).await;
        item(&db, "Chips", "Snacks", 4).await;

        SalesService::new(db.clone(), WriteMode::Atomic)
            .record_sale(&NewSaleRequest {
                item_id: Some(cola.id.clone()),
                quantity: Some(3),
                unit_price: Some(DecimalInput::new("2.00")),
            })
            .await
            .unwrap();
        ExpenseService::new(db.clone())
            .create_expense(&NewExpenseRequest {
                description: Some("Ice".to_string()),
                category: Some("Supplies".to_string()),
                amount: Some(DecimalInput::new("1.50")),
                spent_at: None,
            })
            .await
            .unwrap();

        let overview = OverviewService::new(db, 10).overview(Utc::now()).await.unwrap();

        assert_eq!(overview.total_revenue.cents(), 600);
        assert_eq!(overview.total_expenses.cents(), 150);
        assert_eq!(overview.net_profit.cents(), 450);
        assert_eq!(overview.today_sales.cents(), 600);
        assert_eq!(overview.total_items, 2);
        // Chips at 4, Cola at 9 after the sale
        assert_eq!(overview.low_stock_items, 2);
    }
}
